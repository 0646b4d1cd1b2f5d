//! Product search by name.

use similar::TextDiff;

/// Lowest similarity ratio a name needs to match a query it does not contain.
pub const FUZZY_THRESHOLD: f32 = 0.7;

/// How well `name` matches `query`, both compared case-insensitively.
///
/// A name containing the query scores 1.0. Otherwise the score is the
/// character similarity ratio, and names below [`FUZZY_THRESHOLD`] do not
/// match at all.
pub fn match_score(query: &str, name: &str) -> Option<f32> {
    let query = query.trim().to_lowercase();
    let name = name.to_lowercase();
    if name.contains(&query) {
        return Some(1.0);
    }
    let ratio = TextDiff::from_chars(query.as_str(), name.as_str()).ratio();
    (ratio >= FUZZY_THRESHOLD).then_some(ratio)
}

/// Keeps the items whose name matches `query`, best match first. Items with
/// equal scores keep their original order. A blank query keeps everything.
pub fn search<T>(items: Vec<T>, query: &str, name: impl Fn(&T) -> &str) -> Vec<T> {
    if query.trim().is_empty() {
        return items;
    }
    let mut scored: Vec<(T, f32)> = items
        .into_iter()
        .filter_map(|item| match_score(query, name(&item)).map(|score| (item, score)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().map(|(item, _)| item).collect()
}
