//! Structural validation of inbound GeoJSON values.
//!
//! This gate only checks the *shape* contract: the value must be a mapping
//! with `type == "Polygon"` and a non-empty array under `coordinates`. Ring
//! closure, winding, and topology are deliberately out of scope here; the
//! repair stage owns those.

use serde_json::Value;

use super::boundary::BoundaryError;

/// Accept `value` when it looks like a GeoJSON Polygon object, otherwise
/// fail with [`BoundaryError::InvalidShape`] naming `field`.
///
/// # Errors
///
/// [`BoundaryError::InvalidShape`] describing the structural violation.
pub fn validate_polygon_shape(value: &Value, field: &str) -> Result<(), BoundaryError> {
    let Some(object) = value.as_object() else {
        return Err(BoundaryError::invalid_shape(
            field,
            "value must be an object representing a GeoJSON geometry",
        ));
    };

    match object.get("type").and_then(Value::as_str) {
        Some("Polygon") => {}
        Some(other) => {
            return Err(BoundaryError::invalid_shape(
                field,
                format!("geometry type must be Polygon, got '{other}'"),
            ));
        }
        None => {
            return Err(BoundaryError::invalid_shape(
                field,
                "geometry object is missing a string 'type' member",
            ));
        }
    }

    match object.get("coordinates") {
        Some(Value::Array(rings)) if !rings.is_empty() => Ok(()),
        Some(Value::Array(_)) => Err(BoundaryError::invalid_shape(
            field,
            "'coordinates' must be a non-empty array of rings",
        )),
        _ => Err(BoundaryError::invalid_shape(
            field,
            "geometry object is missing a 'coordinates' array",
        )),
    }
}

/// Variant of [`validate_polygon_shape`] for optional inputs: absent values
/// pass through untouched.
///
/// # Errors
///
/// [`BoundaryError::InvalidShape`] when a present value fails the contract.
pub fn validate_optional_polygon_shape<'a>(
    value: Option<&'a Value>,
    field: &str,
) -> Result<Option<&'a Value>, BoundaryError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            validate_polygon_shape(raw, field)?;
            Ok(Some(raw))
        }
    }
}
