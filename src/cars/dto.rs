use serde::Deserialize;

use crate::cars::repo::CarStatus;

/// Request body for adding a car.
#[derive(Debug, Deserialize)]
pub struct AddCarRequest {
    pub name: String,
    pub model: String,
    pub status: CarStatus,
}

/// Request body for updating a car; all fields required.
#[derive(Debug, Deserialize)]
pub struct UpdateCarRequest {
    pub name: String,
    pub model: String,
    pub status: CarStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_car_request_parses() {
        let body = r#"{"name":"Civic1","model":"civic","status":"available"}"#;
        let req = serde_json::from_str::<AddCarRequest>(body).unwrap();
        assert_eq!(req.name, "Civic1");
        assert_eq!(req.status, CarStatus::Available);
    }

    #[test]
    fn add_car_request_rejects_bad_status() {
        let body = r#"{"name":"Civic1","model":"civic","status":"broken"}"#;
        assert!(serde_json::from_str::<AddCarRequest>(body).is_err());
    }
}
