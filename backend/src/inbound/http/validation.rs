//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::domain::{DeletionScope, Error};

/// Default page size when the client does not ask for one.
pub(crate) const DEFAULT_LIMIT: i64 = 50;
/// Hard cap on the page size.
pub(crate) const MAX_LIMIT: i64 = 100;

fn invalid_param(field: &str, message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// Parse the `filter_by` query parameter into a deletion scope.
pub(crate) fn parse_filter_by(raw: Option<&str>) -> Result<DeletionScope, Error> {
    DeletionScope::from_filter_param(raw).ok_or_else(|| {
        invalid_param(
            "filter_by",
            "incorrect value for filter_by parameter; possible values: 'deleted' or 'all'",
            "invalid_filter",
        )
    })
}

/// Parse the `boundary` query parameter, a JSON-encoded GeoJSON string.
/// Structural and topological validation happens in the domain; this only
/// undoes the query-string encoding.
pub(crate) fn parse_boundary_param(raw: Option<&str>) -> Result<Option<Value>, Error> {
    match raw {
        None => Ok(None),
        Some(encoded) => serde_json::from_str(encoded).map(Some).map_err(|err| {
            invalid_param(
                "boundary",
                format!("boundary must be a JSON-encoded GeoJSON object: {err}"),
                "invalid_json",
            )
        }),
    }
}

/// Parse an optional RFC 3339 timestamp field.
pub(crate) fn parse_optional_rfc3339(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| {
                    invalid_param(
                        field,
                        format!("{field} must be an RFC 3339 timestamp"),
                        "invalid_timestamp",
                    )
                })
        })
        .transpose()
}

/// Normalise pagination parameters, rejecting negatives and capping the
/// page size at [`MAX_LIMIT`].
pub(crate) fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> Result<(i64, i64), Error> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let offset = offset.unwrap_or(0);

    if limit < 1 {
        return Err(invalid_param(
            "limit",
            "limit must be a positive integer",
            "invalid_limit",
        ));
    }
    if offset < 0 {
        return Err(invalid_param(
            "offset",
            "offset must not be negative",
            "invalid_offset",
        ));
    }

    Ok((limit.min(MAX_LIMIT), offset))
}
