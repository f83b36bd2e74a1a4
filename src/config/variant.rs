//! Canvas API variant definitions.
//!
//! This module provides the [`ApiVariant`] enum describing which primary
//! root collection a Canvas installation exposes. The variant is detected
//! once per client at construction time and cached on the client instance.

use std::fmt;

/// The API variant of a Canvas installation.
///
/// Different Canvas deployments expose a different primary root collection,
/// advertised through the `X-Canvas-Meta` response header as a small JSON
/// payload (e.g., `{"primaryCollection": "accounts"}`). The variant is used
/// by resource services to adapt request shaping; the transport core only
/// detects and caches it.
///
/// # Example
///
/// ```rust
/// use canvas_api::ApiVariant;
///
/// let variant = ApiVariant::from_collection("accounts");
/// assert_eq!(variant, ApiVariant::Accounts);
/// assert_eq!(variant.collection(), "accounts");
///
/// // Unrecognized collections are preserved verbatim
/// let variant = ApiVariant::from_collection("districts");
/// assert_eq!(variant, ApiVariant::Custom("districts".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVariant {
    /// Account-rooted installation (the common hosted deployment).
    Accounts,
    /// Course-rooted installation (instances scoped to a single account).
    Courses,
    /// Any other root collection reported by the server.
    Custom(String),
}

impl ApiVariant {
    /// Maps a reported primary collection name to a variant.
    ///
    /// Matching is case-insensitive; surrounding whitespace is ignored. An
    /// empty name maps to the default variant.
    #[must_use]
    pub fn from_collection(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "" | "accounts" => Self::Accounts,
            "courses" => Self::Courses,
            _ => Self::Custom(name),
        }
    }

    /// Returns the primary collection name for this variant.
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::Accounts => "accounts",
            Self::Courses => "courses",
            Self::Custom(name) => name,
        }
    }

    /// Returns `true` if this is a recognized variant.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl Default for ApiVariant {
    /// The account-rooted variant, assumed when detection is unavailable.
    fn default() -> Self {
        Self::Accounts
    }
}

impl fmt::Display for ApiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_collection_maps_known_names() {
        assert_eq!(ApiVariant::from_collection("accounts"), ApiVariant::Accounts);
        assert_eq!(ApiVariant::from_collection("courses"), ApiVariant::Courses);
    }

    #[test]
    fn test_from_collection_normalizes_case_and_whitespace() {
        assert_eq!(
            ApiVariant::from_collection(" Accounts "),
            ApiVariant::Accounts
        );
        assert_eq!(ApiVariant::from_collection("COURSES"), ApiVariant::Courses);
    }

    #[test]
    fn test_from_collection_preserves_unknown_names() {
        let variant = ApiVariant::from_collection("districts");
        assert_eq!(variant, ApiVariant::Custom("districts".to_string()));
        assert!(!variant.is_known());
    }

    #[test]
    fn test_from_collection_empty_falls_back_to_default() {
        assert_eq!(ApiVariant::from_collection(""), ApiVariant::default());
    }

    #[test]
    fn test_default_is_accounts() {
        assert_eq!(ApiVariant::default(), ApiVariant::Accounts);
    }

    #[test]
    fn test_display_prints_collection_name() {
        assert_eq!(ApiVariant::Accounts.to_string(), "accounts");
        assert_eq!(ApiVariant::Courses.to_string(), "courses");
        assert_eq!(
            ApiVariant::Custom("districts".to_string()).to_string(),
            "districts"
        );
    }
}
