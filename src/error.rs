use std::fmt;

/// Stable failure kinds returned to the invoking party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedPayload,
    InvalidEntity,
    AlreadyExists,
    NotFound,
    ReferenceNotFound,
    InvalidTransition,
    LedgerUnavailable,
}

#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("{kind} {id} does not exist")]
    NotFound { kind: &'static str, id: String },
    #[error("referenced {kind} {id} does not exist")]
    ReferenceNotFound { kind: &'static str, id: String },
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required {entity} field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    #[error("{entity} field `{field}` must be greater than zero")]
    NotPositive {
        entity: &'static str,
        field: &'static str,
    },
    #[error("unrecognised {field} value `{value}`")]
    UnknownValue { field: &'static str, value: String },
    #[error("a new {entity} must start as {expected}, got {got}")]
    NotInitialStatus {
        entity: &'static str,
        expected: &'static str,
        got: String,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("storage failure: {0}")]
    Io(#[from] sled::Error),
    #[error("read conflict on {key}: read version {read}, committed version {current}")]
    Conflict { key: String, read: u64, current: u64 },
    #[error("corrupt ledger record under {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("{0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, ContractError>;

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            ContractError::InvalidEntity(_) => ErrorKind::InvalidEntity,
            ContractError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            ContractError::NotFound { .. } => ErrorKind::NotFound,
            ContractError::ReferenceNotFound { .. } => ErrorKind::ReferenceNotFound,
            ContractError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            ContractError::LedgerUnavailable(_) => ErrorKind::LedgerUnavailable,
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedPayload => "MalformedPayload",
            ErrorKind::InvalidEntity => "InvalidEntity",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ReferenceNotFound => "ReferenceNotFound",
            ErrorKind::InvalidTransition => "InvalidTransition",
            ErrorKind::LedgerUnavailable => "LedgerUnavailable",
        }
    }

    /// Only ledger faults may be resubmitted unchanged; the contract itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::LedgerUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ValidationError> for ContractError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnknownValue { .. } => ContractError::MalformedPayload(err.to_string()),
            _ => ContractError::InvalidEntity(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        ContractError::MalformedPayload(err.to_string())
    }
}

impl LedgerError {
    pub fn corrupt(key: &str, reason: impl fmt::Display) -> Self {
        LedgerError::Corrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_enum_value_is_malformed_payload() {
        let err: ContractError = ValidationError::UnknownValue {
            field: "status",
            value: "Pending".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn missing_field_is_invalid_entity() {
        let err: ContractError = ValidationError::MissingField {
            entity: "bid",
            field: "bidId",
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidEntity);
        assert!(err.to_string().contains("bidId"));
    }

    #[test]
    fn only_ledger_faults_are_retryable() {
        let conflict = ContractError::from(LedgerError::Conflict {
            key: "bid~B1".into(),
            read: 1,
            current: 2,
        });
        assert!(conflict.kind().is_retryable());
        assert!(!ErrorKind::InvalidTransition.is_retryable());
        assert!(!ErrorKind::AlreadyExists.is_retryable());
    }
}
