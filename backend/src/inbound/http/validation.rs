//! Shared validation helpers for inbound HTTP adapters.
//!
//! Validation failures carry a `{field, code, value?}` details object so
//! clients can surface the error next to the offending form field.

use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidValue,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidValue => "invalid_value",
            Self::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_value_error(field: FieldName, message: impl std::fmt::Display) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("{name}: {message}"),
        ErrorCode::InvalidValue,
    )
}

pub(crate) fn out_of_range_error(field: FieldName, message: impl std::fmt::Display) -> Error {
    let name = field.as_str();
    field_error(field, format!("{name}: {message}"), ErrorCode::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn invalid_value_includes_the_reason() {
        let error = invalid_value_error(FieldName::new("category"), "unknown hotspot category");
        assert!(error.message().contains("category"));
        let details = error.details().expect("details attached");
        assert_eq!(details["field"], "category");
        assert_eq!(details["code"], "invalid_value");
    }

    #[rstest]
    fn out_of_range_names_the_field() {
        let error = out_of_range_error(FieldName::new("latitude"), "latitude out of range");
        let details = error.details().expect("details attached");
        assert_eq!(details["field"], "latitude");
        assert_eq!(details["code"], "out_of_range");
    }
}
