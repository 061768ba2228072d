use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{repo::UserStore, Claims},
    crops::{
        dto::ListingInput,
        repo::CropStore,
        repo_types::{Crop, NewCrop},
    },
    error::AppError,
    images::services::{store_image, UploadItem},
    state::AppState,
};

/// Inserts a listing owned by `owner`, freezing the owner's current display name into it.
pub async fn create_listing(
    users: &dyn UserStore,
    crops: &dyn CropStore,
    owner: &Claims,
    input: ListingInput,
    image: Option<String>,
) -> Result<Crop, AppError> {
    let farmer = users
        .find_by_id(owner.sub)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let crop = crops
        .insert(NewCrop {
            farmer_id: farmer.id,
            farmer_name: farmer.name,
            crop_name: input.crop_name,
            quantity: input.quantity,
            price_per_kg: input.price_per_kg,
            location: input.location,
            description: input.description,
            image,
        })
        .await?;

    info!(crop_id = %crop.id, farmer_id = %crop.farmer_id, "crop listed");
    Ok(crop)
}

/// Stores the optional image, then the listing. The image is removed again if the listing fails.
pub async fn create_listing_with_image(
    st: &AppState,
    owner: &Claims,
    input: ListingInput,
    image: Option<UploadItem>,
) -> Result<Crop, AppError> {
    let stored = match image {
        Some(item) => Some(store_image(st.storage.as_ref(), item).await?),
        None => None,
    };
    let image_path = stored.as_ref().map(|s| s.public_path.clone());

    match create_listing(st.users.as_ref(), st.crops.as_ref(), owner, input, image_path).await {
        Ok(crop) => Ok(crop),
        Err(e) => {
            if let Some(s) = stored {
                if let Err(cleanup) = st.storage.delete_object(&s.key).await {
                    warn!(error = %cleanup, key = %s.key, "orphaned upload");
                }
            }
            Err(e)
        }
    }
}

/// Adds one interested buyer. Repeated calls by the same caller each count.
pub async fn record_interest(crops: &dyn CropStore, crop_id: Uuid) -> Result<i64, AppError> {
    let count = crops
        .record_interest(crop_id)
        .await?
        .ok_or(AppError::NotFound("Crop"))?;
    info!(crop_id = %crop_id, interested_buyers = count, "interest recorded");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        jwt::JwtKeys,
        repo::MemoryUserStore,
        repo_types::{NewUser, Role},
    };
    use crate::config::JwtConfig;
    use crate::crops::repo::MemoryCropStore;

    fn keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: "svc".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 60,
        })
    }

    async fn farmer(users: &MemoryUserStore, name: &str, email: &str) -> Claims {
        let user = users
            .insert(NewUser {
                name: name.into(),
                email: email.into(),
                password_hash: "$argon2id$fake".into(),
                role: Role::Farmer,
                location: None,
            })
            .await
            .unwrap();
        let keys = keys();
        keys.verify(&keys.issue(&user).unwrap()).unwrap()
    }

    fn tomatoes() -> ListingInput {
        ListingInput {
            crop_name: "Tomatoes".into(),
            quantity: 100,
            price_per_kg: 40.0,
            location: "Pune".into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn owner_name_is_frozen_at_creation() {
        let users = MemoryUserStore::new();
        let crops = MemoryCropStore::new();
        let owner = farmer(&users, "Asha", "asha@example.com").await;

        let first = create_listing(&users, &crops, &owner, tomatoes(), None).await.unwrap();
        assert_eq!(first.farmer_name, "Asha");

        users.rename(owner.sub, "Asha Patil").await;
        let second = create_listing(&users, &crops, &owner, tomatoes(), None).await.unwrap();
        assert_eq!(second.farmer_name, "Asha Patil");

        let stored = crops.find_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored.farmer_name, "Asha");
    }

    #[tokio::test]
    async fn listing_for_unknown_owner_fails() {
        let users = MemoryUserStore::new();
        let crops = MemoryCropStore::new();
        let mut ghost = farmer(&users, "Asha", "asha@example.com").await;
        ghost.sub = Uuid::new_v4();

        let err = create_listing(&users, &crops, &ghost, tomatoes(), None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("User")));
    }

    #[tokio::test]
    async fn interest_counts_every_call() {
        let users = MemoryUserStore::new();
        let crops = MemoryCropStore::new();
        let owner = farmer(&users, "Asha", "asha@example.com").await;
        let crop = create_listing(&users, &crops, &owner, tomatoes(), None).await.unwrap();

        assert_eq!(record_interest(&crops, crop.id).await.unwrap(), 1);
        assert_eq!(record_interest(&crops, crop.id).await.unwrap(), 2);
        assert!(matches!(
            record_interest(&crops, Uuid::new_v4()).await,
            Err(AppError::NotFound("Crop"))
        ));
    }
}
