//! Shared validation helpers for query strings and multipart fields.

use serde_json::json;

use crate::domain::{AttributeId, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
    InvalidFlag,
    DuplicateField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidFlag => "invalid_flag",
            ErrorCode::DuplicateField => "duplicate_field",
        }
    }
}

/// Newtype wrapper for HTTP field names.
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

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(field, ErrorCode::MissingField, format!("missing required field: {name}"))
}

pub(crate) fn duplicate_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::DuplicateField,
        format!("exactly one {name} field is allowed"),
    )
}

/// Parse a comma-separated id list such as `1,2,3`. Blank segments are skipped.
pub(crate) fn parse_id_list(raw: Option<&str>, field: FieldName) -> Result<Vec<AttributeId>, Error> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment.parse::<i64>().map(AttributeId::new).map_err(|_| {
                let name = field.as_str();
                field_error(
                    field,
                    ErrorCode::InvalidId,
                    format!("{name} must be a comma-separated list of integer ids"),
                )
            })
        })
        .collect()
}

/// Parse a `0`/`1` flag; absence means `false`.
pub(crate) fn parse_flag(raw: Option<&str>, field: FieldName) -> Result<bool, Error> {
    match raw.map(str::trim) {
        None | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(_) => {
            let name = field.as_str();
            Err(field_error(
                field,
                ErrorCode::InvalidFlag,
                format!("{name} must be 0 or 1"),
            ))
        }
    }
}
