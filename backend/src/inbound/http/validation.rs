//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Newtype wrapper for wire field names.
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

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_uuid",
    }))
}

/// Parse a UUID carried as text in a path, query or body field.
pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an optional UUID, treating blank input as absent.
pub(crate) fn parse_optional_uuid(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_uuid(raw, field).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("departmentId");

    #[rstest]
    fn valid_uuid_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), FIELD).expect("uuid"), id);
    }

    #[rstest]
    #[case("nope")]
    #[case("1234")]
    #[case("")]
    fn invalid_uuid_names_the_field(#[case] raw: &str) {
        let err = parse_uuid(raw, FIELD).expect_err("invalid uuid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "departmentId");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn blank_optional_uuid_is_absent(#[case] raw: Option<&str>) {
        assert_eq!(parse_optional_uuid(raw, FIELD).expect("absent"), None);
    }
}
