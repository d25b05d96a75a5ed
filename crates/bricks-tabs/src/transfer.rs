//! Page transfer between views
//!
//! Views that can exchange pages share a [`TransferGroup`]. Moving a page is
//! split in two halves, [`TabView::detach_page`] on the source and
//! [`TabView::attach_page`] on the target, so a drag can carry the page in
//! between. While any transfer is in flight every view of the group reports
//! `is_transferring_page` and its contents refuse pointer interaction.
//!
//! Transfers are counted, not flagged: two drags started back to back keep the
//! group transferring until both have landed.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use crate::error::TabError;
use crate::observer::{Deferred, ViewProperty};
use crate::page::TabPage;
use crate::view::{TabView, ViewId, ViewInner};
use crate::Result;

/// Callback creating a peer view, e.g. a new window to drop a page into.
///
/// It must not keep a strong handle to the requesting view, or the view will
/// never be torn down.
pub type WindowFactory = Arc<dyn Fn(&TabView) -> Option<TabView> + Send + Sync>;

#[derive(Default)]
struct GroupState {
    /// Member views in construction order
    views: Vec<(ViewId, Weak<ViewInner>)>,
    /// Transfers begun and not yet ended
    active: u32,
}

/// A set of views that can exchange pages. Clones share the same group.
#[derive(Clone, Default)]
pub struct TransferGroup {
    state: Arc<Mutex<GroupState>>,
}

impl TransferGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live member views in construction order
    pub fn views(&self) -> Vec<TabView> {
        self.state
            .lock()
            .views
            .iter()
            .filter_map(|(_, view)| view.upgrade())
            .map(TabView::from_inner)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().views.is_empty()
    }

    pub fn contains(&self, view: &TabView) -> bool {
        let id = view.id();
        self.state.lock().views.iter().any(|(member, _)| *member == id)
    }

    /// Whether a transfer is in flight anywhere in the group
    pub fn is_transferring(&self) -> bool {
        self.state.lock().active > 0
    }

    /// Adds `view` and returns the number of transfers currently in flight,
    /// which the new member starts counting from.
    pub(crate) fn register(&self, view: &TabView) -> u32 {
        let mut state = self.state.lock();
        state.views.push((view.id(), view.downgrade()));
        state.active
    }

    pub(crate) fn unregister(&self, id: ViewId) {
        self.state.lock().views.retain(|(member, _)| *member != id);
    }

    fn begin_transfer(&self) {
        {
            let mut state = self.state.lock();
            state.active += 1;
            tracing::debug!(active = state.active, "Transfer started");
        }

        for view in self.views() {
            view.increment_transfer_count();
        }
    }

    fn end_transfer(&self) {
        {
            let mut state = self.state.lock();
            assert!(state.active > 0, "transfer ended without a matching begin");
            state.active -= 1;
            tracing::debug!(active = state.active, "Transfer ended");
        }

        for view in self.views() {
            view.decrement_transfer_count();
        }
    }
}

impl PartialEq for TransferGroup {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for TransferGroup {}

impl std::fmt::Debug for TransferGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TransferGroup")
            .field("views", &state.views.len())
            .field("active", &state.active)
            .finish()
    }
}

impl TabView {
    /// Whether a page transfer is in flight in this view's group
    pub fn is_transferring_page(&self) -> bool {
        self.transfer_count() > 0
    }

    pub(crate) fn transfer_count(&self) -> u32 {
        self.inner.state.lock().transfer_count
    }

    fn set_transfer_count(&self, count: u32) {
        let (was_transferring, pages) = {
            let mut state = self.inner.state.lock();
            let was_transferring = state.transfer_count > 0;
            state.transfer_count = count;
            (was_transferring, state.pages.to_vec())
        };

        let transferring = count > 0;

        if transferring == was_transferring {
            return;
        }

        for page in &pages {
            page.content().set_can_target(!transferring);
        }

        tracing::debug!(view_id = %self.id(), transferring, "Transfer state changed");

        self.queue_notify(Deferred::Property(ViewProperty::IsTransferringPage));
    }

    fn increment_transfer_count(&self) {
        let count = self.transfer_count();
        self.set_transfer_count(count + 1);
    }

    fn decrement_transfer_count(&self) {
        let count = self.transfer_count();
        assert!(
            count > 0,
            "transfer count of view {} is already zero",
            self.id()
        );
        self.set_transfer_count(count - 1);
    }

    /// Detach `page` so it can be attached to another view of the group.
    ///
    /// Starts a transfer for the whole group; the matching
    /// [`attach_page`](Self::attach_page) ends it. The caller's handle keeps
    /// the page alive in between.
    pub fn detach_page(&self, page: &TabPage) {
        self.check_page(page);

        self.group().begin_transfer();
        self.detach(page);
    }

    /// Attach a page previously detached with [`detach_page`](Self::detach_page)
    /// at `position` and select it.
    pub fn attach_page(&self, page: &TabPage, position: usize) {
        assert!(
            !self.owns(page),
            "page {} already belongs to view {}",
            page.id(),
            self.id()
        );

        self.attach(page, position);
        self.items_changed(position, 0, 1);
        self.set_selected(Some(page), true);

        self.group().end_transfer();
    }

    /// Move `page` from this view to `other` at `position`
    pub fn transfer_page(&self, page: &TabPage, other: &TabView, position: usize) {
        self.check_page(page);
        assert!(
            self.group() == other.group(),
            "views {} and {} are in different transfer groups",
            self.id(),
            other.id()
        );
        // Moving within one view leaves one page fewer to insert among
        let n_pages = other.n_pages() - usize::from(other == self);
        assert!(
            position <= n_pages,
            "insert position {position} out of bounds for {n_pages} pages"
        );

        self.detach_page(page);
        other.attach_page(page, position);

        tracing::info!(
            page_id = %page.id(),
            from = %self.id(),
            to = %other.id(),
            position,
            "Page transferred"
        );
    }

    /// Install the callback used by [`create_window`](Self::create_window)
    pub fn set_window_factory<F>(&self, factory: F)
    where
        F: Fn(&TabView) -> Option<TabView> + Send + Sync + 'static,
    {
        *self.inner.window_factory.write() = Some(Arc::new(factory));
    }

    /// Ask the window factory for a new peer view in the same group.
    ///
    /// The new view takes over this view's transfer count, so a transfer in
    /// flight ends cleanly in it.
    pub fn create_window(&self) -> Result<TabView> {
        let factory = self.inner.window_factory.read().clone();

        let Some(factory) = factory else {
            tracing::error!(view_id = %self.id(), "No window factory installed");
            return Err(TabError::NoWindowFactory(self.id()));
        };

        let Some(view) = factory(self) else {
            tracing::error!(view_id = %self.id(), "Window factory did not create a view");
            return Err(TabError::WindowFactoryDeclined(self.id()));
        };

        if view.group() != self.group() {
            tracing::error!(
                view_id = %self.id(),
                new_view_id = %view.id(),
                "Window factory created a view in another transfer group"
            );
            return Err(TabError::ForeignTransferGroup { view: view.id() });
        }

        view.set_transfer_count(self.transfer_count());

        tracing::info!(view_id = %self.id(), new_view_id = %view.id(), "Created window");

        Ok(view)
    }
}

/// A page being dragged out of its view.
///
/// The page is detached while the drag lasts. Dropping an unfinished drag
/// puts the page back where it came from, so the group's transfer count
/// always balances.
#[must_use = "dropping a drag cancels it"]
pub struct TabDrag {
    page: TabPage,
    origin: TabView,
    origin_position: usize,
    done: bool,
}

impl TabDrag {
    pub fn begin(view: &TabView, page: &TabPage) -> Self {
        let origin_position = view.page_position(page);
        view.detach_page(page);

        tracing::debug!(
            view_id = %view.id(),
            page_id = %page.id(),
            position = origin_position,
            "Tab drag started"
        );

        Self {
            page: page.clone(),
            origin: view.clone(),
            origin_position,
            done: false,
        }
    }

    pub fn page(&self) -> &TabPage {
        &self.page
    }

    pub fn origin(&self) -> &TabView {
        &self.origin
    }

    pub fn origin_position(&self) -> usize {
        self.origin_position
    }

    /// Land the page in `target` at `position`
    pub fn drop_at(mut self, target: &TabView, position: usize) {
        assert!(
            target.group() == self.origin.group(),
            "views {} and {} are in different transfer groups",
            self.origin.id(),
            target.id()
        );

        self.done = true;
        target.attach_page(&self.page, position);
    }

    /// Land the page in a new window created by the origin's window factory.
    ///
    /// When no window can be created the drag is cancelled and the error
    /// returned.
    pub fn drop_on_desktop(mut self) -> Result<TabView> {
        let view = self.origin.create_window()?;

        self.done = true;
        view.attach_page(&self.page, 0);

        Ok(view)
    }

    /// Put the page back into its origin view
    pub fn cancel(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.done {
            return;
        }

        self.done = true;

        let position = self.origin_position.min(self.origin.n_pages());
        self.origin.attach_page(&self.page, position);

        tracing::debug!(
            view_id = %self.origin.id(),
            page_id = %self.page.id(),
            position,
            "Tab drag cancelled"
        );
    }
}

impl Drop for TabDrag {
    fn drop(&mut self) {
        self.restore();
    }
}

impl std::fmt::Debug for TabDrag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabDrag")
            .field("page", &self.page.id())
            .field("origin", &self.origin.id())
            .field("origin_position", &self.origin_position)
            .field("done", &self.done)
            .finish()
    }
}
