//! Pages model
//!
//! A read/observe projection of a view's pages as a zero-based indexed list
//! with single selection, for tab bars, overviews and other consumers that
//! only think in positions.
//!
//! Change notifications are positional diffs:
//!
//! - insertion at `p`: `items_changed(p, 0, 1)`
//! - removal at `p`: `items_changed(p, 1, 0)`
//! - move between `a` and `b`: `items_changed(min, n, n)` with
//!   `n = max - min + 1`, since items moved rather than being replaced
//! - selection change: one `selection_changed(min, n)` covering the old and
//!   new selected positions that exist
//!
//! The model holds its view weakly. Once the view is gone it reports no items
//! and refuses selection.

use std::sync::{Arc, Weak};

use crate::observer::HandlerId;
use crate::page::TabPage;
use crate::view::{TabView, ViewInner};

/// Receives positional diffs from a [`TabPages`] model
pub trait PagesModelObserver: Send + Sync {
    fn items_changed(&self, position: usize, removed: usize, added: usize);

    fn selection_changed(&self, _position: usize, _n_items: usize) {}
}

#[derive(Clone)]
pub struct TabPages {
    view: Weak<ViewInner>,
}

impl TabPages {
    pub(crate) fn new(view: &TabView) -> Self {
        Self {
            view: view.downgrade(),
        }
    }

    /// The view behind this model, if it is still alive
    pub fn view(&self) -> Option<TabView> {
        self.view.upgrade().map(TabView::from_inner)
    }

    pub fn n_items(&self) -> usize {
        self.view().map_or(0, |view| view.n_pages())
    }

    pub fn item(&self, position: usize) -> Option<TabPage> {
        let view = self.view()?;

        if position >= view.n_pages() {
            return None;
        }

        Some(view.nth_page(position))
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.item(position).is_some_and(|page| page.is_selected())
    }

    /// Select the page at `position`. Returns `false` when the view is gone
    /// or `position` holds no page.
    pub fn select_item(&self, position: usize) -> bool {
        let Some(page) = self.item(position) else {
            return false;
        };
        let Some(view) = self.view() else {
            return false;
        };

        view.set_selected_page(&page);
        true
    }

    /// Returns `None` when the view is already gone
    pub fn connect(&self, observer: Arc<dyn PagesModelObserver>) -> Option<HandlerId> {
        let view = self.view()?;
        let id = HandlerId::next();
        view.inner.model_observers.write().push((id, observer));
        Some(id)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        let Some(view) = self.view() else {
            return false;
        };

        let mut observers = view.inner.model_observers.write();
        let before = observers.len();
        observers.retain(|(handler, _)| *handler != id);
        observers.len() != before
    }
}

impl std::fmt::Debug for TabPages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabPages")
            .field("view", &self.view().map(|view| view.id()))
            .finish()
    }
}

/// The range a selection diff covers, given the old and new selected positions
pub(crate) fn selection_range(old: Option<usize>, new: Option<usize>) -> Option<(usize, usize)> {
    match (old, new) {
        (None, None) => None,
        (Some(position), None) | (None, Some(position)) => Some((position, 1)),
        (Some(old), Some(new)) => {
            let min = old.min(new);
            Some((min, old.max(new) - min + 1))
        }
    }
}
