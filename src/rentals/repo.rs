use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::cars::repo::CarStatus;
use crate::rentals::dates::iso_date;

/// Rental record. A rental is "active" as long as the row exists; deleting
/// it is what ends the rental and releases the car.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub rental_date: Date,
    #[serde(with = "iso_date")]
    pub return_date: Date,
    pub created_at: OffsetDateTime,
}

const RENTAL_COLUMNS: &str = "id, car_id, user_id, rental_date, return_date, created_at";

impl Rental {
    pub async fn find_by_car(db: &PgPool, car_id: Uuid) -> anyhow::Result<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals WHERE car_id = $1"
        ))
        .bind(car_id)
        .fetch_optional(db)
        .await?;
        Ok(rental)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(rental)
    }

    /// Ownership-scoped lookup: the rental must reference the given car and
    /// have been booked by the given user.
    pub async fn find_scoped(
        db: &PgPool,
        id: Uuid,
        car_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals
             WHERE id = $1 AND car_id = $2 AND user_id = $3"
        ))
        .bind(id)
        .bind(car_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(rental)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals ORDER BY created_at ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rentals)
    }

    /// Inserts the rental and flips the car to `rented` in one transaction,
    /// so a failure on either side leaves the store consistent. The unique
    /// index on `car_id` rejects a concurrent double-booking that slipped
    /// past the caller's existence check.
    pub async fn create(
        db: &PgPool,
        car_id: Uuid,
        user_id: Uuid,
        rental_date: Date,
        return_date: Date,
    ) -> anyhow::Result<Rental> {
        let mut tx = db.begin().await?;
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "INSERT INTO rentals (car_id, user_id, rental_date, return_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {RENTAL_COLUMNS}"
        ))
        .bind(car_id)
        .bind(user_id)
        .bind(rental_date)
        .bind(return_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(r#"UPDATE cars SET status = $2 WHERE id = $1"#)
            .bind(car_id)
            .bind(CarStatus::Rented)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rental)
    }

    /// Re-dates the rental. The car's status is untouched: the car was
    /// already rented and stays rented. Returns None when no row matched
    /// or the new dates equal the stored ones (a no-op update is reported
    /// as a failure).
    pub async fn update_dates(
        db: &PgPool,
        id: Uuid,
        rental_date: Date,
        return_date: Date,
    ) -> anyhow::Result<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "UPDATE rentals
             SET rental_date = $2, return_date = $3
             WHERE id = $1
               AND (rental_date, return_date) IS DISTINCT FROM ($2, $3)
             RETURNING {RENTAL_COLUMNS}"
        ))
        .bind(id)
        .bind(rental_date)
        .bind(return_date)
        .fetch_optional(db)
        .await?;
        Ok(rental)
    }

    /// Ends the rental: deletes the row and flips the car back to
    /// `available`, in one transaction.
    pub async fn delete(db: &PgPool, id: Uuid, car_id: Uuid) -> anyhow::Result<u64> {
        let mut tx = db.begin().await?;
        let result = sqlx::query(r#"DELETE FROM rentals WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r#"UPDATE cars SET status = $2 WHERE id = $1"#)
            .bind(car_id)
            .bind(CarStatus::Available)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
