//! View notifications
//!
//! Observers are called synchronously, in the order the corresponding
//! mutations happen, and never while the view holds an internal lock. A
//! handler may therefore call straight back into the view, e.g. to confirm a
//! close request.
//!
//! Property and selection notifications can be grouped with
//! [`TabView::freeze_notify`]: while a freeze guard is alive they are queued
//! and coalesced, and they fire in first-queued order when the last guard is
//! dropped.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::page::TabPage;
use crate::view::TabView;

/// Token returned by the various `connect` methods, used to disconnect again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Observable view-level properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewProperty {
    NPages,
    SelectedPage,
    IsTransferringPage,
}

impl ViewProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewProperty::NPages => "n-pages",
            ViewProperty::SelectedPage => "selected-page",
            ViewProperty::IsTransferringPage => "is-transferring-page",
        }
    }
}

impl std::fmt::Display for ViewProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives structured notifications from a [`TabView`].
///
/// Every method has an empty default so observers only implement what they
/// care about.
pub trait TabViewObserver: Send + Sync {
    /// `page` was inserted at `position`, either newly created or transferred in
    fn page_attached(&self, _view: &TabView, _page: &TabPage, _position: usize) {}

    /// `page` was removed from `position`, either closed or transferred out
    fn page_detached(&self, _view: &TabView, _page: &TabPage, _position: usize) {}

    /// `page` was moved to `position`
    fn page_reordered(&self, _view: &TabView, _page: &TabPage, _position: usize) {}

    /// The selected page changed.
    ///
    /// Positions are taken when the notification is delivered. After a frozen
    /// block `old` is `None` if the previously selected page has left the view.
    fn selection_changed(&self, _view: &TabView, _old: Option<usize>, _new: Option<usize>) {}

    /// A close was requested for `page`.
    ///
    /// Return `true` to take over the request: the observer must then call
    /// [`TabView::close_page_finish`] itself, possibly much later. When no
    /// observer handles the request the view confirms it immediately.
    fn close_page(&self, _view: &TabView, _page: &TabPage) -> bool {
        false
    }

    /// The indicator icon of `page` was activated
    fn indicator_activated(&self, _view: &TabView, _page: &TabPage) {}

    fn property_changed(&self, _view: &TabView, _property: ViewProperty) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Deferred {
    Property(ViewProperty),
    /// Pages rather than positions, so reorders while frozen cannot skew them
    Selection {
        old: Option<TabPage>,
        new: Option<TabPage>,
    },
}

/// Freeze bookkeeping for one view
#[derive(Debug, Default)]
pub(crate) struct NotifyQueue {
    depth: u32,
    pending: Vec<Deferred>,
}

impl NotifyQueue {
    pub(crate) fn freeze(&mut self) {
        self.depth += 1;
    }

    /// Returns the queued notifications once the outermost freeze is released.
    pub(crate) fn thaw(&mut self) -> Vec<Deferred> {
        assert!(self.depth > 0, "thaw without a matching freeze");
        self.depth -= 1;

        if self.depth > 0 {
            return Vec::new();
        }

        let mut pending = std::mem::take(&mut self.pending);

        // A selection that ended where it started is no change at all
        let reverted = pending
            .iter()
            .any(|queued| matches!(queued, Deferred::Selection { old, new } if old == new));

        if reverted {
            pending.retain(|queued| {
                !matches!(
                    queued,
                    Deferred::Selection { .. } | Deferred::Property(ViewProperty::SelectedPage)
                )
            });
        }

        pending
    }

    /// Queues `notification` while frozen; hands it back for immediate
    /// delivery otherwise.
    pub(crate) fn push(&mut self, notification: Deferred) -> Option<Deferred> {
        if self.depth == 0 {
            return Some(notification);
        }

        match notification {
            Deferred::Property(_) => {
                if !self.pending.contains(&notification) {
                    self.pending.push(notification);
                }
            }
            Deferred::Selection { old, new } => {
                // Keep the first old page, take the latest new one
                let queued = self.pending.iter_mut().find_map(|queued| match queued {
                    Deferred::Selection { new, .. } => Some(new),
                    Deferred::Property(_) => None,
                });

                match queued {
                    Some(queued_new) => *queued_new = new,
                    None => self.pending.push(Deferred::Selection { old, new }),
                }
            }
        }

        None
    }
}

/// Keeps a view's notifications frozen while alive.
///
/// Created by [`TabView::freeze_notify`]. Guards nest; queued notifications
/// are delivered when the last one is dropped.
#[must_use = "notifications thaw as soon as the guard is dropped"]
pub struct NotifyFreezeGuard {
    pub(crate) view: TabView,
}

impl Drop for NotifyFreezeGuard {
    fn drop(&mut self) {
        self.view.thaw_notify();
    }
}
