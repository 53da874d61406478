//! Keyword matching and cuisine expansion.

use std::collections::HashSet;

use crate::place::PlaceRecord;

/// Category words that describe "somewhere to eat" rather than a cuisine.
/// They are fine as upstream search terms but impose no local filter.
pub const GENERIC_KEYWORDS: &[&str] = &["餐厅", "美食", "餐馆", "restaurant", "food"];

/// Cuisines the fuzzy search expands a keyword against.
pub const CUISINE_VOCABULARY: &[&str] = &[
    "中餐", "西餐", "日料", "韩料", "火锅", "烧烤", "川菜", "粤菜", "湘菜", "鲁菜", "浙菜", "闽菜",
    "苏菜", "徽菜", "快餐", "小吃", "甜品", "咖啡",
];

/// Returns `true` for blank keywords and generic category words.
#[must_use]
pub fn is_generic(keyword: &str) -> bool {
    let k = keyword.trim();
    k.is_empty() || GENERIC_KEYWORDS.iter().any(|g| g.eq_ignore_ascii_case(k))
}

/// Vocabulary entries similar to `keyword`, in vocabulary order.
///
/// An entry is similar when it equals the keyword, starts with it, contains
/// it, or shares more than half of its distinct characters (relative to the
/// longer of the two). The keyword itself is never returned.
#[must_use]
pub fn expand_cuisine(keyword: &str) -> Vec<String> {
    let query = keyword.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let query_chars: HashSet<char> = query.chars().collect();

    CUISINE_VOCABULARY
        .iter()
        .filter(|entry| {
            let target = entry.to_lowercase();
            if target == query {
                return false;
            }
            if target.starts_with(&query) || target.contains(&query) {
                return true;
            }
            let target_chars: HashSet<char> = target.chars().collect();
            let shared = query_chars.intersection(&target_chars).count();
            let longest = query.chars().count().max(target.chars().count());
            #[allow(clippy::cast_precision_loss)]
            let overlap = shared as f64 / longest as f64;
            overlap > 0.5
        })
        .map(|entry| (*entry).to_string())
        .collect()
}

/// Whether `record` satisfies `keyword`.
///
/// Without fuzzy matching the whole keyword must appear, case-insensitively,
/// in the name or in one of the tags. With fuzzy matching any
/// whitespace-delimited token of the keyword may appear in the name, the
/// address or a tag. A blank keyword matches everything.
#[must_use]
pub fn matches(record: &PlaceRecord, keyword: &str, fuzzy: bool) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return true;
    }

    let name = record.name.to_lowercase();
    let tags: Vec<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();

    if !fuzzy {
        return name.contains(&keyword) || tags.iter().any(|t| t.contains(&keyword));
    }

    let address = record
        .address
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    keyword.split_whitespace().any(|token| {
        name.contains(token) || address.contains(token) || tags.iter().any(|t| t.contains(token))
    })
}
