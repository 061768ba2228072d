//! Placeholder price band.
//!
//! This is not a model: the band is the caller's price (or a default) scaled
//! by two uniform random draws. It carries no predictive value and exists so
//! the client has something to render.

use rand::Rng;

use super::dto::{PriceSuggestion, PriceSuggestionRequest};

pub const DEFAULT_BASE_PRICE: f64 = 50.0;
pub const DEMAND_RANGE: (f64, f64) = (0.85, 1.15);
pub const SEASONAL_RANGE: (f64, f64) = (0.8, 1.2);
pub const MAX_OVER_MIN: f64 = 1.2;

const HIGH_DEMAND: &str = "High demand expected";
const MODERATE_DEMAND: &str = "Moderate demand expected";
const CONFIDENCE: &str = "87%";
const FACTORS: [&str; 3] = ["Seasonal trends", "Local demand", "Quality assessment"];

/// Caller's price when it is a positive number, the default otherwise.
pub fn base_price(req: &PriceSuggestionRequest) -> f64 {
    req.current_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(DEFAULT_BASE_PRICE)
}

pub fn suggest(req: &PriceSuggestionRequest) -> PriceSuggestion {
    suggest_with(&mut rand::thread_rng(), req)
}

pub fn suggest_with<R: Rng>(rng: &mut R, req: &PriceSuggestionRequest) -> PriceSuggestion {
    let base = base_price(req);
    let demand = rng.gen_range(DEMAND_RANGE.0..=DEMAND_RANGE.1);
    let seasonal = rng.gen_range(SEASONAL_RANGE.0..=SEASONAL_RANGE.1);

    let min_price = (base * demand * seasonal).round() as i64;
    let max_price = (min_price as f64 * MAX_OVER_MIN).round() as i64;

    PriceSuggestion {
        min_price,
        max_price,
        demand_forecast: if rng.gen_bool(0.5) { HIGH_DEMAND } else { MODERATE_DEMAND },
        confidence: CONFIDENCE,
        factors: FACTORS,
    }
}
