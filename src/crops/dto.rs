use serde::Serialize;

use crate::{error::AppError, images::services::UploadItem};

/// Raw multipart fields of a listing submission.
#[derive(Default)]
pub struct CropForm {
    pub crop_name: Option<String>,
    pub quantity: Option<String>,
    pub price_per_kg: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image: Option<UploadItem>,
}

/// Listing fields after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingInput {
    pub crop_name: String,
    pub quantity: i64,
    pub price_per_kg: f64,
    pub location: String,
    pub description: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

impl CropForm {
    pub fn validate(self) -> Result<(ListingInput, Option<UploadItem>), AppError> {
        let crop_name = required(self.crop_name, "cropName")?;
        let location = required(self.location, "location")?;

        let quantity = required(self.quantity, "quantity")?
            .parse::<i64>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| AppError::Validation("quantity must be a positive whole number".into()))?;

        let price_per_kg = required(self.price_per_kg, "pricePerKg")?
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| AppError::Validation("pricePerKg must be a positive number".into()))?;

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok((
            ListingInput {
                crop_name,
                quantity,
                price_per_kg,
                location,
                description,
            },
            self.image.filter(|img| !img.body.is_empty()),
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestResponse {
    pub message: String,
    pub interested_buyers: i64,
}
