//! Materials store endpoints.

use tracing::instrument;

use nivasity_core::{DepartmentId, MaterialId, SchoolId};

use crate::client::{ApiRequest, NivasityClient};
use crate::error::ApiError;
use crate::models::material::{RawMaterial, RawMaterialPage};
use crate::models::{Material, MaterialPage};

/// Filters for the material listing.
#[derive(Debug, Default, Clone)]
pub struct MaterialQuery {
    /// Restrict to a school.
    pub school: Option<SchoolId>,
    /// Restrict to a department.
    pub department: Option<DepartmentId>,
    /// Free-text search over titles and course codes.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl MaterialQuery {
    /// Render as a query string, empty when no filter is set.
    fn to_query_string(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if let Some(school) = self.school {
            params.push(format!("school={school}"));
        }
        if let Some(department) = self.department {
            params.push(format!("department={department}"));
        }
        if let Some(search) = &self.search
            && !search.is_empty()
        {
            params.push(format!("search={}", urlencoding::encode(search)));
        }
        if let Some(page) = self.page {
            params.push(format!("page={page}"));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

impl NivasityClient {
    /// List materials matching the given filters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, auth, or payload failures.
    #[instrument(skip(self, query))]
    pub async fn materials(&self, query: &MaterialQuery) -> Result<MaterialPage, ApiError> {
        let path = format!("/materials{}", query.to_query_string());
        let raw: RawMaterialPage = self.execute(ApiRequest::get(path)).await?;
        raw.normalize()
    }

    /// Fetch one material by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the
    /// material does not exist.
    #[instrument(skip(self))]
    pub async fn material(&self, id: MaterialId) -> Result<Material, ApiError> {
        let raw: RawMaterial = self
            .execute(ApiRequest::get(format!("/materials/{id}")))
            .await?;
        raw.normalize()
    }
}
