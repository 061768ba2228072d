use serde::{Deserialize, Serialize};

/// Accepted for API compatibility; only `current_price` influences the result.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceSuggestionRequest {
    pub crop_name: Option<String>,
    pub quantity: Option<f64>,
    pub current_price: Option<f64>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    pub min_price: i64,
    pub max_price: i64,
    pub demand_forecast: &'static str,
    pub confidence: &'static str,
    pub factors: [&'static str; 3],
}
