use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: i64,
}

/// Request body for sign-in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Request body for profile update; every field is required and the
/// password is re-hashed.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: i64,
}

/// Response returned after a successful sign-in.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            phone_number: 5550001,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("a@x.com"));
    }

    #[test]
    fn sign_up_request_requires_all_fields() {
        let missing_phone = r#"{"name":"Alice","email":"a@x.com","password":"pw123456"}"#;
        assert!(serde_json::from_str::<SignUpRequest>(missing_phone).is_err());

        let full = r#"{"name":"Alice","email":"a@x.com","password":"pw123456","phone_number":5550001}"#;
        let req = serde_json::from_str::<SignUpRequest>(full).unwrap();
        assert_eq!(req.phone_number, 5550001);
    }
}
