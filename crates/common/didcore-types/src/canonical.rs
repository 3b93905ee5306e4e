use crate::error::{CoreError, Result, VpErrorCode};
use serde::Serialize;

/// Canonical signing input: compact JSON in struct field order.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| CoreError::new(VpErrorCode::HashFailed).with_source(e))
}
