//! Title search over loaded entries.

use crate::models::MediaItem;

/// Entries whose title contains `query`, ignoring case, in original order.
///
/// An empty query matches everything.
pub fn filter_by_title<'a, I>(items: I, query: &str) -> Vec<&'a MediaItem>
where
    I: IntoIterator<Item = &'a MediaItem>,
{
    let needle = query.to_lowercase();
    items
        .into_iter()
        .filter(|item| needle.is_empty() || item.title.to_lowercase().contains(&needle))
        .collect()
}
