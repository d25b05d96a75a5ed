//! Accessibility tree interface
//!
//! Assistive technology layers see a view as the parent of its pages, in
//! display order. This is a read-only window onto the view and is kept apart
//! from the page management API.

use crate::page::TabPage;
use crate::view::{TabView, ViewId};

pub trait AccessibleTree {
    fn accessible_child_count(&self) -> usize;

    fn accessible_child(&self, index: usize) -> Option<TabPage>;

    /// The page after `page`, `None` for the last page or a foreign page
    fn next_accessible_sibling(&self, page: &TabPage) -> Option<TabPage>;

    fn accessible_parent(&self, page: &TabPage) -> Option<ViewId>;
}

impl AccessibleTree for TabView {
    fn accessible_child_count(&self) -> usize {
        self.n_pages()
    }

    fn accessible_child(&self, index: usize) -> Option<TabPage> {
        let state = self.inner.state.lock();

        (index < state.pages.count()).then(|| state.pages.get(index).clone())
    }

    fn next_accessible_sibling(&self, page: &TabPage) -> Option<TabPage> {
        let state = self.inner.state.lock();
        let position = state.pages.position_of(page)?;

        (position + 1 < state.pages.count()).then(|| state.pages.get(position + 1).clone())
    }

    fn accessible_parent(&self, page: &TabPage) -> Option<ViewId> {
        page.view_id().filter(|id| *id == self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::append_pages;
    use crate::transfer::TransferGroup;

    #[test]
    fn test_children_in_display_order() {
        let view = TabView::new(&TransferGroup::new());
        let pages = append_pages(&view, &["a", "b", "c"]);
        view.reorder_first(&pages[2]);

        assert_eq!(view.accessible_child_count(), 3);
        assert_eq!(view.accessible_child(0), Some(pages[2].clone()));
        assert_eq!(view.accessible_child(3), None);
        assert_eq!(view.next_accessible_sibling(&pages[2]), Some(pages[0].clone()));
        assert_eq!(view.next_accessible_sibling(&pages[1]), None);
    }

    #[test]
    fn test_parent() {
        let group = TransferGroup::new();
        let view = TabView::new(&group);
        let other = TabView::new(&group);
        let pages = append_pages(&view, &["a"]);

        assert_eq!(view.accessible_parent(&pages[0]), Some(view.id()));
        assert_eq!(other.accessible_parent(&pages[0]), None);
        assert_eq!(other.next_accessible_sibling(&pages[0]), None);
    }
}
