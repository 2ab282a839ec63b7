//! Error types for noteproc-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcError {
    /// Required data for the processor mode was not supplied.
    ///
    /// Lists every missing field, not only the first one.
    #[error("missing required fields in data. {} missing", .missing.join(", "))]
    Configuration { missing: Vec<String> },

    /// An argument outside the declared contract reached the builder.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// A stage deemed its condition fatal.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// A node without a recognizable type reached rendering-tree conversion.
    #[error("expected node, got `{0}`")]
    UnknownNode(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

impl ProcError {
    pub fn missing_fields(missing: Vec<String>) -> Self {
        Self::Configuration { missing }
    }

    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Names of the missing fields for configuration errors.
    pub fn missing(&self) -> Option<&[String]> {
        match self {
            Self::Configuration { missing } => Some(missing),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_lists_every_field() {
        let err = ProcError::missing_fields(vec!["vault".into(), "fname".into()]);
        assert_eq!(
            err.to_string(),
            "missing required fields in data. vault, fname missing"
        );
        assert_eq!(err.missing().unwrap(), ["vault", "fname"]);
    }

    #[test]
    fn test_stage_error_display() {
        let err = ProcError::stage("publish", "bad link");
        assert!(err.to_string().contains("publish"));
        assert!(err.missing().is_none());
    }
}
