//! Profile endpoints.

use serde::Serialize;
use tracing::instrument;

use nivasity_core::{DepartmentId, SchoolId};

use crate::client::{ApiRequest, NivasityClient};
use crate::error::ApiError;
use crate::models::User;
use crate::models::user::RawUser;
use crate::store::USER_KEY;

/// Partial profile update. `None` fields are omitted from the request so
/// the backend leaves them untouched.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProfileUpdate {
    /// New first name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New avatar image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// New school.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<SchoolId>,
    /// New department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    /// New admission number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_number: Option<String>,
}

impl NivasityClient {
    /// Fetch the signed-in student's profile and refresh the stored copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SessionExpired`] when no usable session exists.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        let raw: RawUser = self.execute(ApiRequest::get("/profile")).await?;
        let user = raw.normalize()?;
        self.cache_user(&user)?;
        Ok(user)
    }

    /// Update the signed-in student's profile and refresh the stored copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when a field
    /// fails validation.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let body = serde_json::to_value(update)?;
        let raw: RawUser = self.execute(ApiRequest::put("/profile", body)).await?;
        let user = raw.normalize()?;
        self.cache_user(&user)?;
        Ok(user)
    }

    /// Keep the persisted user record in step with the latest server copy.
    fn cache_user(&self, user: &User) -> Result<(), ApiError> {
        let json = serde_json::to_string(user)?;
        self.inner.session.store_value(USER_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            phone: Some("+2348031234567".to_string()),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "phone": "+2348031234567" })
        );
    }

    #[test]
    fn test_profile_update_serializes_ids_as_numbers() {
        let update = ProfileUpdate {
            school_id: Some(SchoolId::new(3)),
            department_id: Some(DepartmentId::new(41)),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "school_id": 3, "department_id": 41 }));
    }
}
