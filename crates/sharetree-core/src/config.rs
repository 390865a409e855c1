//! Reconciler configuration loading.
//!
//! A configuration document names the identity fields the default policy
//! probes, a default identity tree, and the logging profile. JSON and TOML
//! are both accepted; every key is optional.
//!
//! ```toml
//! identity_fields = ["id", "uuid", "key"]
//! log_profile = "production"
//!
//! [identity]
//! items = "customId"
//! grid = [0, "uuid"]
//! ```

use crate::errors::{ExError, ShareTreeError};
use crate::log_op_error;
use crate::logging_facility::{self, Profile};
use crate::model::IdentityConfig;
use crate::reconcile::DEFAULT_IDENTITY_FIELDS;
use crate::schema::OP_LOAD_CONFIG;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Field names probed, in order, to infer an array's identity field
    pub identity_fields: Vec<String>,
    /// Identity configuration used when a call supplies none
    pub identity: IdentityConfig,
    pub log_profile: Profile,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            identity_fields: DEFAULT_IDENTITY_FIELDS
                .iter()
                .map(|field| field.to_string())
                .collect(),
            identity: IdentityConfig::Inferred,
            log_profile: Profile::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// `ERR_SERIALIZATION` when the text is not valid JSON for this shape,
    /// `ERR_INVALID_CONFIG` when it names an empty identity field.
    pub fn from_json_str(text: &str) -> Result<Self, ExError> {
        let start = Instant::now();
        Self::parse_json(text).map_err(|e| fail(e, start, None))
    }

    /// Parse and validate a TOML configuration document.
    ///
    /// # Errors
    ///
    /// `ERR_SERIALIZATION` when the text is not valid TOML for this shape,
    /// `ERR_INVALID_CONFIG` when it names an empty identity field.
    pub fn from_toml_str(text: &str) -> Result<Self, ExError> {
        let start = Instant::now();
        Self::parse_toml(text).map_err(|e| fail(e, start, None))
    }

    /// Load a configuration file, choosing the format by extension
    /// (`.json` or `.toml`, case-insensitive).
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_INPUT` for any other extension and `ERR_IO` when the file
    /// cannot be read, in addition to the parse and validation errors of the
    /// string loaders. Every error carries the path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExError> {
        let path = path.as_ref();
        let start = Instant::now();
        Self::load(path).map_err(|e| fail(e, start, Some(path)))
    }

    fn load(path: &Path) -> Result<Self, ShareTreeError> {
        let display = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, ShareTreeError> = match extension.as_deref() {
            Some("json") => Self::parse_json,
            Some("toml") => Self::parse_toml,
            _ => return Err(ShareTreeError::UnsupportedConfigFormat { path: display }),
        };

        let text = std::fs::read_to_string(path).map_err(|e| ShareTreeError::ConfigRead {
            path: display,
            message: e.to_string(),
        })?;
        parse(&text)
    }

    fn parse_json(text: &str) -> Result<Self, ShareTreeError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_toml(text: &str) -> Result<Self, ShareTreeError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every configured identity field name is non-empty.
    ///
    /// # Errors
    ///
    /// [`ShareTreeError::EmptyIdentityField`] naming the first offending
    /// entry, e.g. `identity_fields[1]` or `identity.grid[0]`.
    pub fn validate(&self) -> Result<(), ShareTreeError> {
        if let Some(index) = self.identity_fields.iter().position(String::is_empty) {
            return Err(ShareTreeError::EmptyIdentityField {
                location: format!("identity_fields[{}]", index),
            });
        }

        let mut empty = None;
        self.identity.walk_fields(&mut |path, name| {
            if name.is_empty() && empty.is_none() {
                empty = Some(if path.is_empty() {
                    "identity".to_string()
                } else if path.starts_with('[') {
                    format!("identity{}", path)
                } else {
                    format!("identity.{}", path)
                });
            }
        });
        match empty {
            Some(location) => Err(ShareTreeError::EmptyIdentityField { location }),
            None => Ok(()),
        }
    }

    /// Install the configured logging profile. Later calls are no-ops.
    pub fn init_logging(&self) {
        logging_facility::init(self.log_profile);
    }
}

fn fail(err: ShareTreeError, start: Instant, path: Option<&Path>) -> ExError {
    log_op_error!(
        OP_LOAD_CONFIG,
        err.clone(),
        duration_ms = start.elapsed().as_millis() as u64
    );
    let ex_err = ExError::from(err).with_op(OP_LOAD_CONFIG);
    match path {
        Some(path) => ex_err.with_path(path.display().to_string()),
        None => ex_err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    #[test]
    fn test_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.identity_fields, vec!["id", "uuid"]);
        assert_eq!(config.identity, IdentityConfig::Inferred);
        assert_eq!(config.log_profile, Profile::Development);
    }

    #[test]
    fn test_empty_documents_use_defaults() {
        assert_eq!(
            ReconcilerConfig::from_json_str("{}").unwrap(),
            ReconcilerConfig::default()
        );
        assert_eq!(
            ReconcilerConfig::from_toml_str("").unwrap(),
            ReconcilerConfig::default()
        );
    }

    #[test]
    fn test_json_document() {
        let config = ReconcilerConfig::from_json_str(
            r#"{
                "identity_fields": ["key"],
                "identity": { "items": "customId", "grid": [null, "uuid"] },
                "log_profile": "production"
            }"#,
        )
        .unwrap();

        assert_eq!(config.identity_fields, vec!["key"]);
        assert_eq!(config.log_profile, Profile::Production);
        assert_eq!(
            config
                .identity
                .for_key("grid")
                .and_then(|c| c.for_position(1))
                .and_then(IdentityConfig::explicit_field),
            Some("uuid")
        );
    }

    #[test]
    fn test_toml_document() {
        let config = ReconcilerConfig::from_toml_str(
            r#"
            log_profile = "test"

            [identity]
            items = "customId"
            grid = [0, "uuid"]
            "#,
        )
        .unwrap();

        assert_eq!(config.identity_fields, vec!["id", "uuid"]);
        assert_eq!(config.log_profile, Profile::Test);
        let grid = config.identity.for_key("grid").unwrap();
        assert_eq!(grid.for_position(0), Some(&IdentityConfig::Inferred));
        assert_eq!(
            grid.for_position(1).and_then(IdentityConfig::explicit_field),
            Some("uuid")
        );
    }

    #[test]
    fn test_parse_errors_are_serialization() {
        let err = ReconcilerConfig::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
        assert_eq!(err.op(), Some(OP_LOAD_CONFIG));
        assert!(err.message().contains("JSON"));

        let err = ReconcilerConfig::from_toml_str("identity_fields = 3").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
        assert!(err.message().contains("TOML"));
    }

    #[test]
    fn test_empty_field_names_are_rejected_with_location() {
        let err = ReconcilerConfig::from_json_str(r#"{ "identity_fields": ["id", ""] }"#)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
        assert!(err.message().contains("identity_fields[1]"));

        let err = ReconcilerConfig::from_json_str(r#"{ "identity": { "grid": ["", "x"] } }"#)
            .unwrap_err();
        assert_eq!(err.code(), "ERR_INVALID_CONFIG");
        assert!(err.message().contains("identity.grid[0]"));

        let err = ReconcilerConfig::from_json_str(r#"{ "identity": "" }"#).unwrap_err();
        assert!(err.message().contains("at identity"));
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let config = ReconcilerConfig {
            identity_fields: vec!["key".to_string()],
            identity: IdentityConfig::keys([("items", IdentityConfig::field("customId"))]),
            log_profile: Profile::Production,
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(ReconcilerConfig::from_json_str(&text).unwrap(), config);
    }
}
