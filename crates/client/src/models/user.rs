//! Canonical user profile record and its backend payload variants.

use serde::{Deserialize, Serialize};

use nivasity_core::{DepartmentId, Email, Phone, SchoolId, UserId};

use crate::error::ApiError;

/// A student profile, normalized from whichever payload variant the backend
/// sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Account email address.
    pub email: Email,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number, if one was provided at registration.
    pub phone: Option<Phone>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// School the student belongs to.
    pub school_id: Option<SchoolId>,
    /// Department within the school.
    pub department_id: Option<DepartmentId>,
    /// Admission (matriculation) number.
    pub admission_number: Option<String>,
}

impl User {
    /// The student's full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Raw user payload as the backend sends it.
///
/// Aliases cover the spellings used by older endpoints: the auth endpoints
/// send `first_name`/`last_name`/`phone`, while the profile endpoints have
/// historically used `firstname`/`surname`/`phone_number` and `photo` for
/// the avatar.
#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    #[serde(alias = "user_id")]
    id: i64,
    email: String,
    #[serde(default, alias = "firstname")]
    first_name: Option<String>,
    #[serde(default, alias = "lastname", alias = "surname")]
    last_name: Option<String>,
    #[serde(default, alias = "phone_number")]
    phone: Option<String>,
    #[serde(default, alias = "avatar", alias = "photo")]
    avatar_url: Option<String>,
    #[serde(default)]
    school_id: Option<i64>,
    #[serde(default, alias = "dept_id")]
    department_id: Option<i64>,
    #[serde(default, alias = "matric_no", alias = "admission_no")]
    admission_number: Option<String>,
}

impl RawUser {
    /// Map the raw payload into the canonical record.
    ///
    /// An unparseable email is fatal (the account is unusable without one);
    /// an unparseable phone number is dropped with a log line, since older
    /// accounts carry free-form values.
    pub(crate) fn normalize(self) -> Result<User, ApiError> {
        let email = Email::parse(&self.email)
            .map_err(|e| ApiError::Malformed(format!("user email: {e}")))?;

        let phone = self
            .phone
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match Phone::parse(&raw) {
                Ok(phone) => Some(phone),
                Err(err) => {
                    tracing::debug!(error = %err, "dropping unparseable phone number");
                    None
                }
            });

        Ok(User {
            id: UserId::new(self.id),
            email,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            phone,
            avatar_url: self.avatar_url.filter(|url| !url.is_empty()),
            school_id: self.school_id.map(SchoolId::new),
            department_id: self.department_id.map(DepartmentId::new),
            admission_number: self.admission_number.filter(|n| !n.is_empty()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn normalize(json: &str) -> Result<User, ApiError> {
        serde_json::from_str::<RawUser>(json).unwrap().normalize()
    }

    #[test]
    fn test_normalize_auth_variant() {
        let user = normalize(
            r#"{
                "id": 12,
                "email": "ada@unilag.edu.ng",
                "first_name": "Ada",
                "last_name": "Obi",
                "phone": "+234 803 123 4567",
                "avatar_url": "https://cdn.nivasity.com/avatars/12.png",
                "school_id": 3,
                "department_id": 41,
                "admission_number": "190404001"
            }"#,
        )
        .unwrap();

        assert_eq!(user.id, UserId::new(12));
        assert_eq!(user.email.as_str(), "ada@unilag.edu.ng");
        assert_eq!(user.full_name(), "Ada Obi");
        assert_eq!(user.phone.unwrap().as_str(), "+2348031234567");
        assert_eq!(user.school_id, Some(SchoolId::new(3)));
        assert_eq!(user.admission_number.as_deref(), Some("190404001"));
    }

    #[test]
    fn test_normalize_profile_variant_spellings() {
        let user = normalize(
            r#"{
                "user_id": 12,
                "email": "Ada@Unilag.edu.NG",
                "firstname": "Ada",
                "surname": "Obi",
                "phone_number": "08031234567",
                "photo": "https://cdn.nivasity.com/avatars/12.png",
                "dept_id": 41,
                "matric_no": "190404001"
            }"#,
        )
        .unwrap();

        assert_eq!(user.id, UserId::new(12));
        assert_eq!(user.email.as_str(), "ada@unilag.edu.ng");
        assert_eq!(user.last_name, "Obi");
        assert_eq!(user.phone.unwrap().as_str(), "08031234567");
        assert_eq!(user.avatar_url.as_deref(), Some("https://cdn.nivasity.com/avatars/12.png"));
        assert_eq!(user.department_id, Some(DepartmentId::new(41)));
        assert_eq!(user.admission_number.as_deref(), Some("190404001"));
    }

    #[test]
    fn test_normalize_nullable_fields() {
        let user = normalize(
            r#"{
                "id": 7,
                "email": "tunde@futa.edu.ng",
                "first_name": null,
                "last_name": "Bakare",
                "phone": null,
                "avatar_url": "",
                "admission_number": ""
            }"#,
        )
        .unwrap();

        assert_eq!(user.first_name, "");
        assert_eq!(user.full_name(), "Bakare");
        assert_eq!(user.phone, None);
        assert_eq!(user.avatar_url, None);
        assert_eq!(user.admission_number, None);
        assert_eq!(user.school_id, None);
    }

    #[test]
    fn test_normalize_drops_garbage_phone() {
        let user = normalize(
            r#"{"id": 7, "email": "tunde@futa.edu.ng", "phone": "ask my roommate"}"#,
        )
        .unwrap();
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_normalize_rejects_bad_email() {
        let result = normalize(r#"{"id": 7, "email": "not-an-email"}"#);
        assert!(matches!(result, Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_user_storage_roundtrip() {
        let user = normalize(r#"{"id": 7, "email": "tunde@futa.edu.ng"}"#).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        let restored: User = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, user);
    }
}
