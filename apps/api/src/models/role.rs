/// Canonical form of a role name: trimmed and lowercased.
///
/// Catalog entries, graph node ids, and every caller-supplied role string pass
/// through this before comparison, so "  Data Analyst " and "data analyst"
/// name the same role.
pub fn normalize_role(raw: &str) -> String {
    raw.trim().to_lowercase()
}
