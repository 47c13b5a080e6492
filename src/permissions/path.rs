/// One path segment as an identifier: ASCII digits only.
///
/// A value too large for an `i64` saturates to `i64::MAX`, which no stored
/// row carries, so it still holds its position and resolves to nothing.
pub fn parse_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(segment.parse().unwrap_or(i64::MAX))
}

/// Every path segment made only of ASCII digits, parsed, in path order.
///
/// Callers index the result positionally: 0 is the project id, 1 the issue
/// (or member user) id, 2 the comment id.
pub fn extract_ids(path: &str) -> Vec<i64> {
    path.split('/').filter_map(parse_id).collect()
}
