pub const LABEL_VALUE_MAX_LEN: usize = 63;

/// Checks `value` against the cluster's label value rules: empty, or at most
/// 63 characters of `[A-Za-z0-9_.-]` starting and ending with an alphanumeric.
pub fn is_valid_label_value(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }

    let bytes = value.as_bytes();
    let edge_ok = |b: &u8| b.is_ascii_alphanumeric();

    bytes.len() <= LABEL_VALUE_MAX_LEN
        && bytes.first().is_some_and(edge_ok)
        && bytes.last().is_some_and(edge_ok)
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}
