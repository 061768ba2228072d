use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo_types::Role},
    crops::{
        dto::{CropForm, InterestResponse},
        repo_types::Crop,
        services,
    },
    error::AppError,
    extract::{Json, Path},
    images::services::UploadItem,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/crops/my-crops", get(my_crops))
        .route("/crops/available", get(available_crops))
        .route("/crops/:id", get(get_crop))
        .route("/crops/:id/interest", post(record_interest))
}

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/crops/create", post(create_crop))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn read_form(mut mp: Multipart, limit: usize) -> Result<CropForm, AppError> {
    let bad_field = |e: MultipartError| AppError::from_multipart(e, limit);
    let mut form = CropForm::default();
    while let Some(field) = mp.next_field().await.map_err(bad_field)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let body = field.bytes().await.map_err(bad_field)?;
                form.image = Some(UploadItem {
                    body,
                    content_type,
                    file_name,
                });
            }
            "cropName" => form.crop_name = Some(field.text().await.map_err(bad_field)?),
            "quantity" => form.quantity = Some(field.text().await.map_err(bad_field)?),
            "pricePerKg" => form.price_per_kg = Some(field.text().await.map_err(bad_field)?),
            "location" => form.location = Some(field.text().await.map_err(bad_field)?),
            "description" => form.description = Some(field.text().await.map_err(bad_field)?),
            _ => {}
        }
    }
    Ok(form)
}

/// POST /crops/create (multipart: cropName, quantity, pricePerKg, location, description?, image?)
#[instrument(skip(state, caller, mp), fields(user_id = %caller.0.sub))]
pub async fn create_crop(
    State(state): State<AppState>,
    caller: AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Crop>), AppError> {
    caller.require(Role::Farmer)?;
    let (input, image) = read_form(mp?, state.config.max_upload_bytes).await?.validate()?;
    let crop = services::create_listing_with_image(&state, &caller.0, input, image).await?;
    Ok((StatusCode::CREATED, Json(crop)))
}

#[instrument(skip(state, caller), fields(user_id = %caller.0.sub))]
pub async fn my_crops(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Crop>>, AppError> {
    Ok(Json(state.crops.list_by_owner(caller.0.sub).await?))
}

/// Marketplace view: everything except the caller's own listings.
#[instrument(skip(state, caller), fields(user_id = %caller.0.sub))]
pub async fn available_crops(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Crop>>, AppError> {
    Ok(Json(state.crops.list_excluding_owner(caller.0.sub).await?))
}

#[instrument(skip(state, caller), fields(user_id = %caller.0.sub))]
pub async fn get_crop(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Crop>, AppError> {
    let crop = state.crops.find_by_id(id).await?.ok_or(AppError::NotFound("Crop"))?;
    Ok(Json(crop))
}

#[instrument(skip(state, caller), fields(user_id = %caller.0.sub))]
pub async fn record_interest(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterestResponse>, AppError> {
    caller.require(Role::Buyer)?;
    let interested_buyers = services::record_interest(state.crops.as_ref(), id).await?;
    Ok(Json(InterestResponse {
        message: "Interest recorded".into(),
        interested_buyers,
    }))
}
