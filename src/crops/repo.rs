use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::crops::repo_types::{Crop, NewCrop};
use crate::error::StoreError;

#[async_trait]
pub trait CropStore: Send + Sync {
    async fn insert(&self, new: NewCrop) -> Result<Crop, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Crop>, StoreError>;
    /// Listings owned by `farmer_id`, newest first.
    async fn list_by_owner(&self, farmer_id: Uuid) -> Result<Vec<Crop>, StoreError>;
    /// Every listing not owned by `viewer_id`, newest first.
    async fn list_excluding_owner(&self, viewer_id: Uuid) -> Result<Vec<Crop>, StoreError>;
    /// Atomically adds one interested buyer. `None` if the listing does not exist.
    async fn record_interest(&self, id: Uuid) -> Result<Option<i64>, StoreError>;
}

const CROP_COLUMNS: &str = "id, farmer_id, farmer_name, crop_name, quantity, price_per_kg, \
                            location, description, image, interested_buyers, created_at";

#[derive(Clone)]
pub struct PgCropStore {
    db: PgPool,
}

impl PgCropStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CropStore for PgCropStore {
    async fn insert(&self, new: NewCrop) -> Result<Crop, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO crops (id, farmer_id, farmer_name, crop_name, quantity, price_per_kg,
                               location, description, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CROP_COLUMNS}
            "#
        );
        let crop = sqlx::query_as::<_, Crop>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.farmer_id)
            .bind(&new.farmer_name)
            .bind(&new.crop_name)
            .bind(new.quantity)
            .bind(new.price_per_kg)
            .bind(&new.location)
            .bind(&new.description)
            .bind(&new.image)
            .fetch_one(&self.db)
            .await?;
        Ok(crop)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Crop>, StoreError> {
        let sql = format!("SELECT {CROP_COLUMNS} FROM crops WHERE id = $1");
        let crop = sqlx::query_as::<_, Crop>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(crop)
    }

    async fn list_by_owner(&self, farmer_id: Uuid) -> Result<Vec<Crop>, StoreError> {
        let sql = format!(
            "SELECT {CROP_COLUMNS} FROM crops WHERE farmer_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Crop>(&sql)
            .bind(farmer_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn list_excluding_owner(&self, viewer_id: Uuid) -> Result<Vec<Crop>, StoreError> {
        let sql = format!(
            "SELECT {CROP_COLUMNS} FROM crops WHERE farmer_id <> $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Crop>(&sql)
            .bind(viewer_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn record_interest(&self, id: Uuid) -> Result<Option<i64>, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE crops
               SET interested_buyers = interested_buyers + 1
             WHERE id = $1
            RETURNING interested_buyers
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(count)
    }
}

/// Listings kept in insertion order behind a single lock.
#[derive(Default)]
pub struct MemoryCropStore {
    crops: RwLock<Vec<Crop>>,
}

impl MemoryCropStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<'a>(crops: impl DoubleEndedIterator<Item = &'a Crop>) -> Vec<Crop> {
    let mut out: Vec<Crop> = crops.rev().cloned().collect();
    // stable: equal timestamps keep later insertions first
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

#[async_trait]
impl CropStore for MemoryCropStore {
    async fn insert(&self, new: NewCrop) -> Result<Crop, StoreError> {
        let crop = Crop {
            id: Uuid::new_v4(),
            farmer_id: new.farmer_id,
            farmer_name: new.farmer_name,
            crop_name: new.crop_name,
            quantity: new.quantity,
            price_per_kg: new.price_per_kg,
            location: new.location,
            description: new.description,
            image: new.image,
            interested_buyers: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        self.crops.write().await.push(crop.clone());
        Ok(crop)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Crop>, StoreError> {
        Ok(self.crops.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_owner(&self, farmer_id: Uuid) -> Result<Vec<Crop>, StoreError> {
        let crops = self.crops.read().await;
        Ok(newest_first(crops.iter().filter(|c| c.farmer_id == farmer_id)))
    }

    async fn list_excluding_owner(&self, viewer_id: Uuid) -> Result<Vec<Crop>, StoreError> {
        let crops = self.crops.read().await;
        Ok(newest_first(crops.iter().filter(|c| c.farmer_id != viewer_id)))
    }

    async fn record_interest(&self, id: Uuid) -> Result<Option<i64>, StoreError> {
        let mut crops = self.crops.write().await;
        Ok(crops.iter_mut().find(|c| c.id == id).map(|c| {
            c.interested_buyers += 1;
            c.interested_buyers
        }))
    }
}
