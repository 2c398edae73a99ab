//! Courseware material records.

use rust_decimal::Decimal;
use serde::Deserialize;

use nivasity_core::{CurrencyCode, DepartmentId, MaterialId, Price, SchoolId};

use crate::error::ApiError;

/// A purchasable courseware item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    /// Unique material ID.
    pub id: MaterialId,
    /// Display title.
    pub title: String,
    /// Longer description, when the uploader provided one.
    pub description: Option<String>,
    /// Course code this material belongs to (e.g., "CSC 201").
    pub course_code: Option<String>,
    /// Unit price.
    pub price: Price,
    /// School the material is scoped to.
    pub school_id: Option<SchoolId>,
    /// Department the material is scoped to.
    pub department_id: Option<DepartmentId>,
    /// Page count, when known.
    pub pages: Option<u32>,
    /// Cover image URL.
    pub cover_url: Option<String>,
}

/// One page of a material listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialPage {
    /// Materials on this page.
    pub items: Vec<Material>,
    /// 1-based page number.
    pub page: u32,
    /// Total matching materials across all pages.
    pub total: u64,
}

/// Raw material payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMaterial {
    #[serde(alias = "material_id")]
    id: i64,
    #[serde(alias = "name")]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "course")]
    course_code: Option<String>,
    price: Decimal,
    #[serde(default)]
    currency: Option<CurrencyCode>,
    #[serde(default)]
    school_id: Option<i64>,
    #[serde(default, alias = "dept_id")]
    department_id: Option<i64>,
    #[serde(default, alias = "page_count")]
    pages: Option<u32>,
    #[serde(default, alias = "cover", alias = "thumbnail")]
    cover_url: Option<String>,
}

impl RawMaterial {
    pub(crate) fn normalize(self) -> Result<Material, ApiError> {
        let currency = self.currency.unwrap_or_default();
        let price = Price::new(self.price, currency)
            .map_err(|e| ApiError::Malformed(format!("material {}: {e}", self.id)))?;

        Ok(Material {
            id: MaterialId::new(self.id),
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
            course_code: self.course_code.filter(|c| !c.is_empty()),
            price,
            school_id: self.school_id.map(SchoolId::new),
            department_id: self.department_id.map(DepartmentId::new),
            pages: self.pages,
            cover_url: self.cover_url.filter(|c| !c.is_empty()),
        })
    }
}

/// Raw listing payload. Older backend versions named the array `materials`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMaterialPage {
    #[serde(alias = "materials")]
    items: Vec<RawMaterial>,
    #[serde(default = "default_page", alias = "current_page")]
    page: u32,
    #[serde(default, alias = "total_count")]
    total: Option<u64>,
}

const fn default_page() -> u32 {
    1
}

impl RawMaterialPage {
    pub(crate) fn normalize(self) -> Result<MaterialPage, ApiError> {
        let items = self
            .items
            .into_iter()
            .map(RawMaterial::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        let total = self.total.unwrap_or(items.len() as u64);
        Ok(MaterialPage {
            items,
            page: self.page,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_material() {
        let raw: RawMaterial = serde_json::from_str(
            r#"{
                "id": 5,
                "title": "CSC 201 Lecture Notes",
                "course": "CSC 201",
                "price": "1500.00",
                "currency": "NGN",
                "school_id": 3,
                "page_count": 88,
                "thumbnail": "https://cdn.nivasity.com/covers/5.jpg"
            }"#,
        )
        .unwrap();
        let material = raw.normalize().unwrap();

        assert_eq!(material.id, MaterialId::new(5));
        assert_eq!(material.course_code.as_deref(), Some("CSC 201"));
        assert_eq!(material.price.amount(), Decimal::new(150_000, 2));
        assert_eq!(material.price.currency_code(), CurrencyCode::Ngn);
        assert_eq!(material.pages, Some(88));
    }

    #[test]
    fn test_normalize_material_numeric_price_and_defaults() {
        let raw: RawMaterial = serde_json::from_str(
            r#"{"material_id": 9, "name": "GST 101 Past Questions", "price": 0}"#,
        )
        .unwrap();
        let material = raw.normalize().unwrap();

        assert_eq!(material.title, "GST 101 Past Questions");
        assert_eq!(material.price, Price::zero(CurrencyCode::Ngn));
        assert_eq!(material.description, None);
    }

    #[test]
    fn test_normalize_material_rejects_negative_price() {
        let raw: RawMaterial =
            serde_json::from_str(r#"{"id": 9, "title": "Broken", "price": "-10"}"#).unwrap();
        assert!(matches!(raw.normalize(), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_normalize_page_with_legacy_keys() {
        let raw: RawMaterialPage = serde_json::from_str(
            r#"{
                "materials": [
                    {"id": 1, "title": "A", "price": "100"},
                    {"id": 2, "title": "B", "price": "200"}
                ],
                "current_page": 2,
                "total_count": 14
            }"#,
        )
        .unwrap();
        let page = raw.normalize().unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 14);
    }

    #[test]
    fn test_normalize_page_defaults() {
        let raw: RawMaterialPage =
            serde_json::from_str(r#"{"items": [{"id": 1, "title": "A", "price": "100"}]}"#)
                .unwrap();
        let page = raw.normalize().unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total, 1);
    }
}
