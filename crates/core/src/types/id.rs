//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. The backend issues
//! plain integer IDs, so every wrapper serializes transparently.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use nivasity_core::define_id;
/// define_id!(UserId);
/// define_id!(MaterialId);
///
/// let user_id = UserId::new(7);
/// let material_id = MaterialId::new(7);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = material_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(SchoolId);
define_id!(DepartmentId);
define_id!(MaterialId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(TicketId);
define_id!(TicketMessageId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = MaterialId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(MaterialId::from(42), id);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(OrderId::new(1001).to_string(), "1001");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = UserId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");

        let parsed: UserId = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, id);
    }
}
