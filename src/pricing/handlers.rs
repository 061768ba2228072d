use axum::{routing::post, Router};
use tracing::{debug, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::Json,
    pricing::{
        dto::{PriceSuggestion, PriceSuggestionRequest},
        services,
    },
    state::AppState,
};

pub fn pricing_routes() -> Router<AppState> {
    Router::new().route("/ai/price-suggestion", post(price_suggestion))
}

#[instrument(skip(caller, payload), fields(user_id = %caller.0.sub))]
pub async fn price_suggestion(
    caller: AuthUser,
    Json(payload): Json<PriceSuggestionRequest>,
) -> Result<Json<PriceSuggestion>, AppError> {
    debug!(
        crop_name = ?payload.crop_name,
        quantity = ?payload.quantity,
        location = ?payload.location,
        "price suggestion requested"
    );
    Ok(Json(services::suggest(&payload)))
}
