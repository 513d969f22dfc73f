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
    cars::repo::Car,
    error::{is_unique_violation, ApiError},
    extract::Json,
    rentals::{dates::validate_range, dto::RentalDatesRequest, repo::Rental},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/car/:car_id/rental", post(create_rental))
        .route("/rental", get(list_rentals))
        .route(
            "/car/:car_id/rental/:rental_id",
            get(get_rental).put(update_rental).delete(delete_rental),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_rental(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(car_id): Path<Uuid>,
    Json(payload): Json<RentalDatesRequest>,
) -> Result<(StatusCode, Json<Rental>), ApiError> {
    Car::find_by_id(&state.db, car_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No cars found by this id".into()))?;

    // Any rental row for this car blocks a new one, regardless of its dates
    if Rental::find_by_car(&state.db, car_id).await?.is_some() {
        warn!(car_id = %car_id, "car already rented");
        return Err(ApiError::Conflict(
            "This car is already rented, please choose a different one".into(),
        ));
    }

    let (start, end) = validate_range(&payload.rental_date, &payload.return_date)?;

    let rental = match Rental::create(&state.db, car_id, user_id, start, end).await {
        Ok(r) => r,
        // Concurrent booking that passed the existence check above
        Err(e) if is_unique_violation(&e) => {
            warn!(car_id = %car_id, "concurrent rental lost the race");
            return Err(ApiError::Conflict(
                "This car is already rented, please choose a different one".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(rental_id = %rental.id, car_id = %car_id, user_id = %user_id, "rental created");
    Ok((StatusCode::CREATED, Json(rental)))
}

#[instrument(skip(state))]
pub async fn list_rentals(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Rental>>, ApiError> {
    let rentals = Rental::list_all(&state.db).await?;
    if rentals.is_empty() {
        return Err(ApiError::NotFound("There are no rentals yet".into()));
    }
    Ok(Json(rentals))
}

#[instrument(skip(state))]
pub async fn get_rental(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path((car_id, rental_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Rental>, ApiError> {
    // The car is resolved first so a bad car id reads as a car error,
    // not a rental error
    Car::find_by_id(&state.db, car_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No cars found by this id".into()))?;

    let rental = Rental::find_by_id(&state.db, rental_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("This car is not rented yet".into()))?;

    Ok(Json(rental))
}

#[instrument(skip(state, payload))]
pub async fn update_rental(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((car_id, rental_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RentalDatesRequest>,
) -> Result<Json<Rental>, ApiError> {
    Car::find_by_id(&state.db, car_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No cars found by this id".into()))?;

    Rental::find_scoped(&state.db, rental_id, car_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("This car is not rented yet".into()))?;

    let (start, end) = validate_range(&payload.rental_date, &payload.return_date)?;

    let rental = Rental::update_dates(&state.db, rental_id, start, end)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Rental was not updated, please provide new data".into())
        })?;

    info!(rental_id = %rental.id, "rental updated");
    Ok(Json(rental))
}

#[instrument(skip(state))]
pub async fn delete_rental(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((car_id, rental_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    Car::find_by_id(&state.db, car_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No cars found by this id".into()))?;

    Rental::find_scoped(&state.db, rental_id, car_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("This car is not rented yet".into()))?;

    Rental::delete(&state.db, rental_id, car_id).await?;

    info!(rental_id = %rental_id, car_id = %car_id, "rental deleted, car released");
    Ok(Json(json!({ "message": "Rental deleted successfully" })))
}
