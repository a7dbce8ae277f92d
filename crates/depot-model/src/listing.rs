//! Ordered depot listings

use crate::depot::Depot;
use std::cmp::Ordering;

/// Compare display names the way a locale-aware collator does: letters
/// compare case-insensitively first, then lowercase sorts before uppercase.
#[must_use]
pub fn name_order(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map_or(Ordering::Equal, |(x, y)| {
                match (x.is_lowercase(), y.is_lowercase()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => x.cmp(&y),
                }
            })
    })
}

/// Depots sorted by name, minus any whose name matches `excluded`
/// (case-insensitive). Computed fresh on every call.
pub fn list_depots<'a, I>(depots: I, excluded: &[&str]) -> Vec<&'a Depot>
where
    I: IntoIterator<Item = &'a Depot>,
{
    let excluded: Vec<String> = excluded.iter().map(|n| n.trim().to_lowercase()).collect();
    let mut listed: Vec<&Depot> = depots
        .into_iter()
        .filter(|d| !excluded.contains(&d.name.trim().to_lowercase()))
        .collect();
    listed.sort_by(|a, b| name_order(&a.name, &b.name));
    listed
}

/// Case-insensitive substring search over names, in list order
pub fn search_depots<'a, I>(depots: I, query: &str, excluded: &[&str]) -> Vec<&'a Depot>
where
    I: IntoIterator<Item = &'a Depot>,
{
    let needle = query.trim().to_lowercase();
    list_depots(depots, excluded)
        .into_iter()
        .filter(|d| needle.is_empty() || d.name.to_lowercase().contains(&needle))
        .collect()
}
