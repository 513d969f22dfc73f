use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    cars::{
        dto::{AddCarRequest, UpdateCarRequest},
        repo::Car,
    },
    error::{is_unique_violation, ApiError},
    extract::Json,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/car", post(add_car).get(list_cars))
        .route(
            "/car/:car_id",
            get(get_car).put(update_car).delete(delete_car),
        )
}

#[instrument(skip(state, payload))]
pub async fn add_car(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddCarRequest>,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    if payload.name.trim().is_empty() || payload.model.trim().is_empty() {
        return Err(ApiError::InvalidInput("Missing data".into()));
    }

    if Car::find_by_name(&state.db, payload.name.trim()).await?.is_some() {
        warn!(name = %payload.name, "car name already exists");
        return Err(ApiError::Conflict(
            "This car name already exists, please choose a different one".into(),
        ));
    }

    let car = match Car::create(
        &state.db,
        payload.name.trim(),
        payload.model.trim(),
        payload.status,
        user_id,
    )
    .await
    {
        Ok(c) => c,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "This car name already exists, please choose a different one".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(car_id = %car.id, name = %car.name, "car created");
    Ok((StatusCode::CREATED, Json(car)))
}

#[instrument(skip(state))]
pub async fn list_cars(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = Car::list_all(&state.db).await?;
    if cars.is_empty() {
        return Err(ApiError::NotFound("There are no cars yet".into()));
    }
    Ok(Json(cars))
}

#[instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(car_id): Path<Uuid>,
) -> Result<Json<Car>, ApiError> {
    let car = Car::find_by_id(&state.db, car_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("There is no car with this id".into()))?;
    Ok(Json(car))
}

#[instrument(skip(state, payload))]
pub async fn update_car(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(car_id): Path<Uuid>,
    Json(payload): Json<UpdateCarRequest>,
) -> Result<Json<Car>, ApiError> {
    if payload.name.trim().is_empty() || payload.model.trim().is_empty() {
        return Err(ApiError::InvalidInput("Missing data".into()));
    }

    // Ownership is checked first; a car owned by someone else reads the
    // same as a missing car
    Car::find_by_id_and_owner(&state.db, car_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No cars found by this user".into()))?;

    let updated = match Car::update(
        &state.db,
        car_id,
        user_id,
        payload.name.trim(),
        payload.model.trim(),
        payload.status,
    )
    .await
    {
        Ok(c) => c,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "This car name already exists, please choose a different one".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let car = updated
        .ok_or_else(|| ApiError::NotFound("Car was not updated, please provide new data".into()))?;

    info!(car_id = %car.id, "car updated");
    Ok(Json(car))
}

#[instrument(skip(state))]
pub async fn delete_car(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(car_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let deleted = Car::delete(&state.db, car_id, user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("No cars found by this user".into()));
    }

    info!(car_id = %car_id, "car deleted");
    Ok(Json(json!({ "message": "Car deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, JwtConfig};
    use sqlx::PgPool;
    use std::sync::Arc;

    fn state_with(pool: PgPool) -> AppState {
        AppState {
            db: pool,
            config: Arc::new(AppConfig {
                database_url: String::new(),
                jwt: JwtConfig {
                    secret: "test-secret".into(),
                    ttl_hours: 24,
                },
            }),
        }
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (cargo test -- --ignored)"]
    async fn listing_an_empty_registry_is_not_found(pool: PgPool) {
        let err = list_cars(State(state_with(pool)), AuthUser(Uuid::new_v4()))
            .await
            .expect_err("empty registry must not list");
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
