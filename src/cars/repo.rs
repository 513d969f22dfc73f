use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Binary availability flag, kept in sync with the rental ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "car_status", rename_all = "lowercase")]
pub enum CarStatus {
    Available,
    Rented,
}

/// Car record in the database. `user_id` is the creator and scopes
/// update/delete; reads are not restricted by owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub name: String,
    pub model: String,
    pub status: CarStatus,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

const CAR_COLUMNS: &str = "id, name, model, status, user_id, created_at";

impl Car {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(car)
    }

    /// Combined id+owner lookup, the ownership check for mutations.
    pub async fn find_by_id_and_owner(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(car)
    }

    pub async fn find_by_name(db: &PgPool, name: &str) -> anyhow::Result<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(car)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars ORDER BY created_at ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(cars)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        model: &str,
        status: CarStatus,
        user_id: Uuid,
    ) -> anyhow::Result<Car> {
        let car = sqlx::query_as::<_, Car>(&format!(
            "INSERT INTO cars (name, model, status, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {CAR_COLUMNS}"
        ))
        .bind(name)
        .bind(model)
        .bind(status)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(car)
    }

    /// Owner-scoped update. Returns None when no row matched, including a
    /// write carrying values identical to the stored row (the API reports
    /// a no-op update as a failure).
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
        name: &str,
        model: &str,
        status: CarStatus,
    ) -> anyhow::Result<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(&format!(
            "UPDATE cars
             SET name = $3, model = $4, status = $5
             WHERE id = $1 AND user_id = $2
               AND (name, model, status) IS DISTINCT FROM ($3, $4, $5)
             RETURNING {CAR_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(model)
        .bind(status)
        .fetch_optional(db)
        .await?;
        Ok(car)
    }

    /// Owner-scoped delete. Does not inspect rental state.
    pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM cars WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    // --- read-only filter queries (catalog layer) ---

    pub async fn find_by_models(db: &PgPool, models: &[String]) -> anyhow::Result<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE model = ANY($1) ORDER BY created_at ASC"
        ))
        .bind(models)
        .fetch_all(db)
        .await?;
        Ok(cars)
    }

    pub async fn find_by_model_and_status(
        db: &PgPool,
        model: &str,
        status: CarStatus,
    ) -> anyhow::Result<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars
             WHERE model = $1 AND status = $2
             ORDER BY created_at ASC"
        ))
        .bind(model)
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(cars)
    }

    /// Model filter with either known status. With only two statuses this is
    /// effectively a plain model filter, kept as its own query to match the
    /// exposed endpoint.
    pub async fn find_by_model_any_status(db: &PgPool, model: &str) -> anyhow::Result<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars
             WHERE model = $1 AND status IN ('available', 'rented')
             ORDER BY created_at ASC"
        ))
        .bind(model)
        .fetch_all(db)
        .await?;
        Ok(cars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    #[ignore = "needs a running Postgres (cargo test -- --ignored)"]
    async fn update_with_identical_values_matches_nothing(pool: PgPool) -> anyhow::Result<()> {
        let owner = Uuid::new_v4();
        let car = Car::create(&pool, "Civic1", "civic", CarStatus::Available, owner).await?;

        let unchanged = Car::update(
            &pool,
            car.id,
            owner,
            &car.name,
            &car.model,
            car.status,
        )
        .await?;
        assert!(unchanged.is_none());

        let renamed = Car::update(&pool, car.id, owner, "Civic1b", &car.model, car.status).await?;
        assert_eq!(renamed.expect("name changed").name, "Civic1b");
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "needs a running Postgres (cargo test -- --ignored)"]
    async fn update_scoped_to_owner(pool: PgPool) -> anyhow::Result<()> {
        let owner = Uuid::new_v4();
        let car = Car::create(&pool, "Civic2", "civic", CarStatus::Available, owner).await?;

        // Someone else's car reads the same as a missing car
        let stranger = Uuid::new_v4();
        let denied =
            Car::update(&pool, car.id, stranger, "Taken", &car.model, car.status).await?;
        assert!(denied.is_none());
        assert!(Car::find_by_id_and_owner(&pool, car.id, stranger).await?.is_none());
        Ok(())
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CarStatus::Available).unwrap(),
            r#""available""#
        );
        assert_eq!(
            serde_json::to_string(&CarStatus::Rented).unwrap(),
            r#""rented""#
        );
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert!(serde_json::from_str::<CarStatus>(r#""maintenance""#).is_err());
        assert_eq!(
            serde_json::from_str::<CarStatus>(r#""rented""#).unwrap(),
            CarStatus::Rented
        );
    }
}
