use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    cars::repo::{Car, CarStatus},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    pub models: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    pub model: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/model-cars", get(cars_by_models))
        .route("/available-cars", get(available_cars_by_model))
        .route("/rented-cars", get(rented_cars_by_model))
        .route("/available-rented-cars", get(any_status_cars_by_model))
}

/// Splits a comma-separated model list, trimming and lowercasing each entry.
fn parse_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect()
}

fn require_model(q: ModelQuery) -> Result<String, ApiError> {
    match q.model {
        Some(m) if !m.trim().is_empty() => Ok(m.trim().to_lowercase()),
        _ => Err(ApiError::InvalidInput("Missing model query parameter".into())),
    }
}

#[instrument(skip(state))]
pub async fn cars_by_models(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<ModelsQuery>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let raw = q
        .models
        .ok_or_else(|| ApiError::InvalidInput("Missing models query parameter".into()))?;

    let models = parse_models(&raw);
    if models.is_empty() {
        return Err(ApiError::InvalidInput("No valid models provided".into()));
    }

    let cars = Car::find_by_models(&state.db, &models).await?;
    if cars.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No cars found in {} model",
            raw
        )));
    }
    Ok(Json(cars))
}

#[instrument(skip(state))]
pub async fn available_cars_by_model(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<ModelQuery>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let model = require_model(q)?;
    let cars = Car::find_by_model_and_status(&state.db, &model, CarStatus::Available).await?;
    if cars.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No cars available in {model} model"
        )));
    }
    Ok(Json(cars))
}

#[instrument(skip(state))]
pub async fn rented_cars_by_model(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<ModelQuery>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let model = require_model(q)?;
    let cars = Car::find_by_model_and_status(&state.db, &model, CarStatus::Rented).await?;
    if cars.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No cars rented in {model} model"
        )));
    }
    Ok(Json(cars))
}

#[instrument(skip(state))]
pub async fn any_status_cars_by_model(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<ModelQuery>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let model = require_model(q)?;
    let cars = Car::find_by_model_any_status(&state.db, &model).await?;
    if cars.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No cars rented or available in {model} model"
        )));
    }
    Ok(Json(cars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_models_trims_and_lowercases() {
        assert_eq!(
            parse_models(" Civic , COROLLA,model3"),
            vec!["civic", "corolla", "model3"]
        );
    }

    #[test]
    fn parse_models_drops_empty_entries() {
        assert_eq!(parse_models("civic,,  ,corolla"), vec!["civic", "corolla"]);
        assert!(parse_models(", ,").is_empty());
    }

    #[test]
    fn require_model_rejects_missing_or_blank() {
        assert!(require_model(ModelQuery { model: None }).is_err());
        assert!(require_model(ModelQuery { model: Some("  ".into()) }).is_err());
        assert_eq!(
            require_model(ModelQuery { model: Some(" Civic ".into()) }).unwrap(),
            "civic"
        );
    }
}
