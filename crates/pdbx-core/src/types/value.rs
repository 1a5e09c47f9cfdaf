/// The reserved marker for a value that is unknown.
pub const UNKNOWN: &str = "?";

/// The reserved marker for a value that does not apply.
pub const INAPPLICABLE: &str = ".";

/// Returns true if `value` is the unknown marker `?`.
pub fn is_unknown(value: &str) -> bool {
    value == UNKNOWN
}

/// Returns true if `value` is the inapplicable marker `.`.
pub fn is_inapplicable(value: &str) -> bool {
    value == INAPPLICABLE
}

/// Returns true for either null marker.
///
/// An empty string is a real (empty) value, not a null.
pub fn is_null(value: &str) -> bool {
    is_unknown(value) || is_inapplicable(value)
}
