use thiserror::Error;

/// Malformed scenario configuration. Raised before any engine command is issued.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid room '{0}': expected one of box, tdw, house")]
    InvalidRoom(String),

    #[error("invalid range for {field}: [{min}, {max}]")]
    InvalidRange { field: String, min: f64, max: f64 },

    #[error("inconsistent flags: {0}")]
    InconsistentFlags(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("could not read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("could not parse config: {0}")]
    Parse(String),
}

/// A sampling constraint that no prototype satisfies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("no prototype matches the '{role}' selection ({detail})")]
    EmptyCandidateSet { role: String, detail: String },

    #[error("unknown prototype '{0}'")]
    UnknownPrototype(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine payload could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("engine frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    /// An unreadable reply. The stream position is no longer trustworthy.
    #[error("engine reply unusable: {reason}")]
    Desync { reason: String },

    #[error("engine connection closed")]
    Closed,
}

impl EngineError {
    /// The session cannot carry another batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Closed | EngineError::Desync { .. })
    }
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record data corrupted")]
    Corrupted,

    #[error("Decompression error")]
    Decompression,

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Record not found: {path}")]
    NotFound { path: String },
}

#[derive(Error, Debug)]
pub enum TrialError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("object id {0} is already present in the scene")]
    DuplicateObjectId(u32),

    #[error("illegal phase transition {from} -> {to}")]
    PhaseTransition { from: String, to: String },
}

impl TrialError {
    /// Configuration and sampling failures abort the whole run, as does an
    /// engine session that is closed or out of sync.
    pub fn is_fatal(&self) -> bool {
        match self {
            TrialError::Config(_) => true,
            TrialError::Sampling(_) => true,
            TrialError::DuplicateObjectId(_) => true,
            TrialError::PhaseTransition { .. } => true,
            TrialError::Engine(e) => e.is_fatal(),
            TrialError::Record(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrialError>;

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_and_sampling_errors_are_fatal() {
        let err: TrialError = ConfigError::InvalidRoom("attic".into()).into();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "invalid room 'attic': expected one of box, tdw, house"
        );

        let err: TrialError = SamplingError::EmptyCandidateSet {
            role: "target".into(),
            detail: "names=[anvil]".into(),
        }
        .into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_only_broken_sessions_are_fatal() {
        let err: TrialError = EngineError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "slow step",
        ))
        .into();
        assert!(!err.is_fatal());

        let err: TrialError = EngineError::Closed.into();
        assert!(err.is_fatal());
        let err: TrialError = EngineError::Desync {
            reason: "bad json".into(),
        }
        .into();
        assert!(err.is_fatal());
    }
}
