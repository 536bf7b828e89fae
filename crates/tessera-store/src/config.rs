use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Store factory configuration.
///
/// Both checks are off by default, so a default factory accepts any
/// namespace string and never runs out of room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Reject malformed namespace names in `create_store`.
    pub validate_namespaces: bool,
    /// Upper bound on distinct namespaces a factory will create.
    pub max_namespaces: Option<usize>,
}

impl StoreConfig {
    /// Parse a TOML document.
    ///
    /// ```
    /// use tessera_store::StoreConfig;
    ///
    /// let cfg = StoreConfig::from_toml_str("max_namespaces = 4").unwrap();
    /// assert_eq!(cfg.max_namespaces, Some(4));
    /// assert!(!cfg.validate_namespaces);
    /// ```
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert!(!c.validate_namespaces);
        assert!(c.max_namespaces.is_none());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(StoreConfig::from_toml_str("").unwrap(), StoreConfig::default());
    }

    #[test]
    fn full_document() {
        let c = StoreConfig::from_toml_str("validate_namespaces = true\nmax_namespaces = 2\n")
            .unwrap();
        assert!(c.validate_namespaces);
        assert_eq!(c.max_namespaces, Some(2));
    }

    #[test]
    fn bad_document_is_config_error() {
        let err = StoreConfig::from_toml_str("max_namespaces = \"lots\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
