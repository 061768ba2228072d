use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A farmer's crop-for-sale listing.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub farmer_name: String,        // copied from the owner at creation, not kept in sync
    pub crop_name: String,
    pub quantity: i64,              // kg
    pub price_per_kg: f64,
    pub location: String,
    pub description: Option<String>,
    pub image: Option<String>,      // public path of the uploaded image
    pub interested_buyers: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCrop {
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub crop_name: String,
    pub quantity: i64,
    pub price_per_kg: f64,
    pub location: String,
    pub description: Option<String>,
    pub image: Option<String>,
}
