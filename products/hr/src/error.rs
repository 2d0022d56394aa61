use thiserror::Error;

use crate::model::EntityKind;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("{kind} with key {key:?} already exists")]
    Conflict { kind: EntityKind, key: String },
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
    #[error("invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },
}

impl HrError {
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
