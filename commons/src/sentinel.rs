//! Sentinel defaults for scalar fields that cannot be null in state
//!
//! Optional integers default to a reserved value instead of null. The
//! translation happens only when crossing into or out of an API object:
//! expanding a sentinel yields `None`, flattening `None` yields the sentinel.

/// Default for optional integers that are unset
pub const UNSET_INT: i64 = -1;

/// Default for `http_put_response_hop_limit` meaning "let the API decide"
pub const NULL_HOP_LIMIT: i64 = 1357997531;

/// Config value -> API value
pub fn value_or_none(value: i64, sentinel: i64) -> Option<i64> {
    if value == sentinel {
        None
    } else {
        Some(value)
    }
}

/// API value -> config value
pub fn none_to_sentinel(value: Option<i64>, sentinel: i64) -> i64 {
    value.unwrap_or(sentinel)
}
