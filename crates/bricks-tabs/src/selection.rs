//! Selection tracking
//!
//! At most one page of a collection is selected, and exactly one whenever the
//! collection is non-empty. The tracker only stores the choice; the view
//! keeps the pages' `selected` flags and visibility in sync with it.

use crate::collection::PageCollection;
use crate::page::TabPage;

#[derive(Debug, Default)]
pub struct SelectionTracker {
    selected: Option<TabPage>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&TabPage> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, page: &TabPage) -> bool {
        self.selected.as_ref() == Some(page)
    }

    /// Position of the selected page in `pages`
    pub fn position(&self, pages: &PageCollection) -> Option<usize> {
        self.selected
            .as_ref()
            .and_then(|selected| pages.position_of(selected))
    }

    /// Stores the new selection and hands back the previous one
    pub(crate) fn replace(&mut self, page: Option<TabPage>) -> Option<TabPage> {
        std::mem::replace(&mut self.selected, page)
    }
}

/// Picks the page to select in place of `page` before it leaves `pages`.
///
/// 1. When `page` has a parent and the page right before it descends from
///    that parent (or is the parent), that page wins. This keeps the focus in
///    a run of pages opened from the same page.
/// 2. Otherwise the next page.
/// 3. Otherwise the previous page.
/// 4. `None` when `page` is the only page.
pub fn fallback_selection(pages: &PageCollection, page: &TabPage) -> Option<TabPage> {
    let position = pages.position_of(page)?;

    if let Some(parent) = page.parent() {
        if position > 0 {
            let previous = pages.get(position - 1);

            if previous.is_descendant_of(&parent) {
                return Some(previous.clone());
            }
        }
    }

    if position + 1 < pages.count() {
        return Some(pages.get(position + 1).clone());
    }

    if position > 0 {
        return Some(pages.get(position - 1).clone());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContent;

    fn collection(pages: &[&TabPage]) -> PageCollection {
        let mut collection = PageCollection::new();
        for (i, page) in pages.iter().enumerate() {
            collection.insert((*page).clone(), i);
        }
        collection
    }

    fn page(name: &str, parent: Option<&TabPage>) -> TabPage {
        TabPage::new(TestContent::new(name), parent)
    }

    #[test]
    fn test_tracker_replace() {
        let a = page("a", None);
        let b = page("b", None);
        let mut tracker = SelectionTracker::new();

        assert_eq!(tracker.replace(Some(a.clone())), None);
        assert!(tracker.is_selected(&a));
        assert_eq!(tracker.replace(Some(b.clone())), Some(a));
        assert_eq!(tracker.selected(), Some(&b));
        assert_eq!(tracker.position(&collection(&[&b])), Some(0));
    }

    #[test]
    fn test_fallback_prefers_parent_directly_before() {
        let a = page("a", None);
        let a1 = page("a1", Some(&a));
        let b = page("b", None);
        let pages = collection(&[&a, &a1, &b]);

        assert_eq!(fallback_selection(&pages, &a1), Some(a));
    }

    #[test]
    fn test_fallback_prefers_sibling_directly_before() {
        let a = page("a", None);
        let a1 = page("a1", Some(&a));
        let a2 = page("a2", Some(&a));
        let b = page("b", None);
        let pages = collection(&[&a, &a1, &a2, &b]);

        assert_eq!(fallback_selection(&pages, &a2), Some(a1));
    }

    #[test]
    fn test_fallback_next_when_parent_not_adjacent() {
        let a = page("a", None);
        let b = page("b", None);
        let c = page("c", Some(&a));
        let d = page("d", None);
        let pages = collection(&[&a, &b, &c, &d]);

        assert_eq!(fallback_selection(&pages, &c), Some(d));
    }

    #[test]
    fn test_fallback_previous_at_end() {
        let a = page("a", None);
        let b = page("b", None);
        let c = page("c", Some(&a));
        let pages = collection(&[&a, &b, &c]);

        assert_eq!(fallback_selection(&pages, &c), Some(b));
    }

    #[test]
    fn test_fallback_without_parent() {
        let a = page("a", None);
        let b = page("b", None);
        let c = page("c", None);
        let pages = collection(&[&a, &b, &c]);

        assert_eq!(fallback_selection(&pages, &b), Some(c.clone()));
        assert_eq!(fallback_selection(&pages, &c), Some(b));
    }

    #[test]
    fn test_fallback_single_page() {
        let a = page("a", None);
        let pages = collection(&[&a]);

        assert_eq!(fallback_selection(&pages, &a), None);
    }
}
