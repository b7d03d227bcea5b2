use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{NewUser, User, UserPatch};

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new user. Missing fields decode as empty and fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateUserReq {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// REST DTO for updating a user (partial). Absent, null and "" all mean unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateUserReq {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        }
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn user_dto_uses_snake_case_field_names() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let dto = UserDto::from(User {
            id: "8b1c".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            created_at: at,
            updated_at: at,
        });
        let v = serde_json::to_value(&dto).unwrap();
        let mut keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["created_at", "email", "first_name", "id", "last_name", "updated_at"]
        );
        assert_eq!(v["created_at"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn update_request_tolerates_missing_and_null_fields() {
        let req: UpdateUserReq =
            serde_json::from_str(r#"{"first_name":"Jane","email":null}"#).unwrap();
        let patch = UserPatch::from(req);
        assert_eq!(patch.first_name.as_deref(), Some("Jane"));
        assert!(patch.last_name.is_none());
        assert!(patch.email.is_none());
    }

    #[test]
    fn create_request_missing_field_decodes_as_empty() {
        let req: CreateUserReq =
            serde_json::from_str(r#"{"first_name":"John","email":"j@x.io"}"#).unwrap();
        assert_eq!(req.last_name, "");
    }
}
