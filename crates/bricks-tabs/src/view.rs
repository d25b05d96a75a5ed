//! Tab view
//!
//! The view owns an ordered collection of pages and keeps exactly one of them
//! selected while it has any. It drives the content of its pages (only the
//! selected content is shown), runs the close handshake, and reports every
//! mutation to its observers and its pages model.
//!
//! Internal locks are only held for the bookkeeping itself. Observers, page
//! notify callbacks and content handles are always called with no view lock
//! held.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use uuid::Uuid;

use crate::collection::PageCollection;
use crate::config::TabViewConfig;
use crate::content::{same_content, Content};
use crate::observer::{
    Deferred, HandlerId, NotifyFreezeGuard, NotifyQueue, TabViewObserver, ViewProperty,
};
use crate::page::TabPage;
use crate::pages::{selection_range, PagesModelObserver, TabPages};
use crate::selection::{fallback_selection, SelectionTracker};
use crate::transfer::{TransferGroup, WindowFactory};

/// Stable identity of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct ViewState {
    pub(crate) pages: PageCollection,
    pub(crate) selection: SelectionTracker,
    pub(crate) transfer_count: u32,
}

pub(crate) struct ViewInner {
    id: ViewId,
    config: TabViewConfig,
    group: TransferGroup,
    pub(crate) state: Mutex<ViewState>,
    observers: RwLock<Vec<(HandlerId, Arc<dyn TabViewObserver>)>>,
    pub(crate) model_observers: RwLock<Vec<(HandlerId, Arc<dyn PagesModelObserver>)>>,
    notify_queue: Mutex<NotifyQueue>,
    pub(crate) window_factory: RwLock<Option<WindowFactory>>,
}

impl Drop for ViewInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.selection.replace(None);
        let pages = std::mem::take(&mut state.pages).into_vec();

        if !pages.is_empty() {
            for (_, observer) in self.model_observers.get_mut().iter() {
                observer.items_changed(0, pages.len(), 0);
            }
        }

        for page in &pages {
            page.set_selected(false);
            page.set_closing(false);
            release_content(page);
        }

        self.group.unregister(self.id);

        tracing::debug!(view_id = %self.id, n_pages = pages.len(), "Tab view disposed");
    }
}

fn release_content(page: &TabPage) {
    page.set_view(None);

    let content = page.content();
    content.set_child_visible(false);
    content.set_parent(None);
}

/// Handle to a tab view. Clones share the same view; equality is identity.
///
/// The view is torn down when the last handle is dropped: its pages are
/// released without any observer callbacks and it leaves its transfer group.
#[derive(Clone)]
pub struct TabView {
    pub(crate) inner: Arc<ViewInner>,
}

impl TabView {
    /// Create a view with the default configuration, joining `group`
    pub fn new(group: &TransferGroup) -> Self {
        Self::with_config(group, TabViewConfig::default())
    }

    pub fn with_config(group: &TransferGroup, config: TabViewConfig) -> Self {
        let view = Self {
            inner: Arc::new(ViewInner {
                id: ViewId::new(),
                config,
                group: group.clone(),
                state: Mutex::new(ViewState {
                    pages: PageCollection::new(),
                    selection: SelectionTracker::new(),
                    transfer_count: 0,
                }),
                observers: RwLock::new(Vec::new()),
                model_observers: RwLock::new(Vec::new()),
                notify_queue: Mutex::new(NotifyQueue::default()),
                window_factory: RwLock::new(None),
            }),
        };

        let in_flight = group.register(&view);
        view.inner.state.lock().transfer_count = in_flight;

        tracing::info!(view_id = %view.id(), "Created tab view");

        view
    }

    pub(crate) fn from_inner(inner: Arc<ViewInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ViewInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn id(&self) -> ViewId {
        self.inner.id
    }

    pub fn config(&self) -> &TabViewConfig {
        &self.inner.config
    }

    pub fn group(&self) -> &TransferGroup {
        &self.inner.group
    }

    pub fn connect(&self, observer: Arc<dyn TabViewObserver>) -> HandlerId {
        let id = HandlerId::next();
        self.inner.observers.write().push((id, observer));
        id
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut observers = self.inner.observers.write();
        let before = observers.len();
        observers.retain(|(handler, _)| *handler != id);
        observers.len() != before
    }

    pub fn n_pages(&self) -> usize {
        self.inner.state.lock().pages.count()
    }

    pub fn selected_page(&self) -> Option<TabPage> {
        self.inner.state.lock().selection.selected().cloned()
    }

    /// Positional, observable projection of this view's pages
    pub fn pages(&self) -> TabPages {
        TabPages::new(self)
    }

    pub fn nth_page(&self, position: usize) -> TabPage {
        self.inner.state.lock().pages.get(position).clone()
    }

    /// Position of `page`, which must belong to this view
    pub fn page_position(&self, page: &TabPage) -> usize {
        let state = self.inner.state.lock();
        self.position_in(&state, page)
    }

    /// The page wrapping `content`, which must belong to this view
    pub fn page_for_content(&self, content: &Content) -> TabPage {
        let state = self.inner.state.lock();
        let page = state
            .pages
            .iter()
            .find(|page| same_content(page.content(), content))
            .cloned();

        match page {
            Some(page) => page,
            None => panic!("content does not belong to view {}", self.id()),
        }
    }

    /// Select `page`. Returns `false` when it was already selected.
    pub fn set_selected_page(&self, page: &TabPage) -> bool {
        self.check_page(page);
        self.set_selected(Some(page), true)
    }

    pub fn select_previous_page(&self) -> bool {
        self.select_relative(|position, _| position.checked_sub(1))
    }

    pub fn select_next_page(&self) -> bool {
        self.select_relative(|position, n_pages| (position + 1 < n_pages).then_some(position + 1))
    }

    pub fn select_first_page(&self) -> bool {
        self.select_relative(|_, _| Some(0))
    }

    pub fn select_last_page(&self) -> bool {
        self.select_relative(|_, n_pages| Some(n_pages - 1))
    }

    /// Add a page for `content`, placed after `parent` and the pages already
    /// opened from it. Without a parent the page is appended.
    pub fn add_page(&self, content: Content, parent: Option<&TabPage>) -> TabPage {
        let position = match parent {
            Some(parent) => {
                let state = self.inner.state.lock();
                let mut position = self.position_in(&state, parent) + 1;

                while position < state.pages.count()
                    && state.pages.get(position).is_descendant_of(parent)
                {
                    position += 1;
                }

                position
            }
            None => self.n_pages(),
        };

        self.create_and_insert(content, parent, position)
    }

    pub fn insert(&self, content: Content, position: usize) -> TabPage {
        self.create_and_insert(content, None, position)
    }

    pub fn prepend(&self, content: Content) -> TabPage {
        self.create_and_insert(content, None, 0)
    }

    pub fn append(&self, content: Content) -> TabPage {
        let position = self.n_pages();
        self.create_and_insert(content, None, position)
    }

    /// Request closing `page`.
    ///
    /// Observers get a chance to take over the request; if none does, the
    /// close is confirmed right away. Does nothing while an earlier request
    /// for the same page is still pending.
    pub fn close_page(&self, page: &TabPage) {
        self.check_page(page);

        if page.is_closing() {
            return;
        }

        page.set_closing(true);

        tracing::debug!(view_id = %self.id(), page_id = %page.id(), "Close requested");

        let handled = self
            .observers()
            .iter()
            .any(|observer| observer.close_page(self, page));

        if !handled {
            self.close_page_finish(page, true);
        }
    }

    /// Complete a pending close request, detaching `page` when `confirm` is set
    pub fn close_page_finish(&self, page: &TabPage, confirm: bool) {
        self.check_page(page);
        assert!(
            page.is_closing(),
            "close_page_finish called for page {} that is not closing",
            page.id()
        );

        page.set_closing(false);

        tracing::debug!(
            view_id = %self.id(),
            page_id = %page.id(),
            confirm,
            "Close request finished"
        );

        if confirm {
            self.detach(page);
        }
    }

    pub fn close_other_pages(&self, page: &TabPage) {
        self.check_page(page);

        let others: Vec<TabPage> = self
            .page_snapshot()
            .into_iter()
            .filter(|other| other != page)
            .collect();

        self.close_in_reverse(others);
    }

    pub fn close_pages_before(&self, page: &TabPage) {
        let position = self.page_position(page);
        let mut pages = self.page_snapshot();
        pages.truncate(position);

        self.close_in_reverse(pages);
    }

    pub fn close_pages_after(&self, page: &TabPage) {
        let position = self.page_position(page);
        let pages = self.page_snapshot().split_off(position + 1);

        self.close_in_reverse(pages);
    }

    /// Move `page` to `position`. Returns `false` when it is already there.
    pub fn reorder_page(&self, page: &TabPage, position: usize) -> bool {
        let original = {
            let mut state = self.inner.state.lock();
            let original = self.position_in(&state, page);

            if original == position {
                return false;
            }

            state.pages.move_page(original, position);
            original
        };

        tracing::debug!(
            view_id = %self.id(),
            page_id = %page.id(),
            from = original,
            to = position,
            "Page reordered"
        );

        self.emit(|observer| observer.page_reordered(self, page, position));

        let min = original.min(position);
        let n_changed = original.max(position) - min + 1;
        self.items_changed(min, n_changed, n_changed);

        true
    }

    pub fn reorder_backward(&self, page: &TabPage) -> bool {
        let position = self.page_position(page);

        if position == 0 {
            return false;
        }

        self.reorder_page(page, position - 1)
    }

    pub fn reorder_forward(&self, page: &TabPage) -> bool {
        let position = self.page_position(page);

        if position + 1 >= self.n_pages() {
            return false;
        }

        self.reorder_page(page, position + 1)
    }

    pub fn reorder_first(&self, page: &TabPage) -> bool {
        self.check_page(page);
        self.reorder_page(page, 0)
    }

    pub fn reorder_last(&self, page: &TabPage) -> bool {
        self.check_page(page);
        let last = self.n_pages() - 1;
        self.reorder_page(page, last)
    }

    /// Report that the indicator icon of `page` was activated
    pub fn activate_indicator(&self, page: &TabPage) {
        self.check_page(page);
        self.emit(|observer| observer.indicator_activated(self, page));
    }

    /// Hide every content that is still visible without being selected.
    ///
    /// Meant to run from the host's idle callback after selection changes.
    /// Returns how many contents were hidden.
    pub fn unmap_extra_pages(&self) -> usize {
        let extra = self.extra_visible_pages();

        for page in &extra {
            page.content().set_child_visible(false);
        }

        if !extra.is_empty() {
            tracing::debug!(view_id = %self.id(), count = extra.len(), "Unmapped extra pages");
        }

        extra.len()
    }

    pub fn has_extra_visible_pages(&self) -> bool {
        !self.extra_visible_pages().is_empty()
    }

    /// Queue property and selection notifications until the guard is dropped
    pub fn freeze_notify(&self) -> NotifyFreezeGuard {
        self.inner.notify_queue.lock().freeze();
        NotifyFreezeGuard { view: self.clone() }
    }

    pub(crate) fn thaw_notify(&self) {
        let pending = self.inner.notify_queue.lock().thaw();

        for notification in pending {
            self.deliver(notification);
        }
    }

    pub(crate) fn queue_notify(&self, notification: Deferred) {
        let ready = self.inner.notify_queue.lock().push(notification);

        if let Some(notification) = ready {
            self.deliver(notification);
        }
    }

    fn deliver(&self, notification: Deferred) {
        match notification {
            Deferred::Property(property) => {
                self.emit(|observer| observer.property_changed(self, property))
            }
            Deferred::Selection { old, new } => {
                let (old, new) = {
                    let state = self.inner.state.lock();
                    (
                        old.and_then(|page| state.pages.position_of(&page)),
                        new.and_then(|page| state.pages.position_of(&page)),
                    )
                };
                self.emit(|observer| observer.selection_changed(self, old, new))
            }
        }
    }

    fn observers(&self) -> Vec<Arc<dyn TabViewObserver>> {
        self.inner
            .observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    fn emit(&self, f: impl Fn(&dyn TabViewObserver)) {
        for observer in self.observers() {
            f(observer.as_ref());
        }
    }

    fn model_observers(&self) -> Vec<Arc<dyn PagesModelObserver>> {
        self.inner
            .model_observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    pub(crate) fn items_changed(&self, position: usize, removed: usize, added: usize) {
        for observer in self.model_observers() {
            observer.items_changed(position, removed, added);
        }
    }

    fn model_selection_changed(&self, old: Option<usize>, new: Option<usize>) {
        let Some((position, n_items)) = selection_range(old, new) else {
            return;
        };

        for observer in self.model_observers() {
            observer.selection_changed(position, n_items);
        }
    }

    fn position_in(&self, state: &ViewState, page: &TabPage) -> usize {
        match state.pages.position_of(page) {
            Some(position) => position,
            None => panic!("page {} does not belong to view {}", page.id(), self.id()),
        }
    }

    pub(crate) fn check_page(&self, page: &TabPage) {
        let state = self.inner.state.lock();
        self.position_in(&state, page);
    }

    pub(crate) fn owns(&self, page: &TabPage) -> bool {
        self.inner.state.lock().pages.contains(page)
    }

    fn page_snapshot(&self) -> Vec<TabPage> {
        self.inner.state.lock().pages.to_vec()
    }

    fn close_in_reverse(&self, pages: Vec<TabPage>) {
        // Earlier closes may already have removed later targets
        for page in pages.iter().rev() {
            if self.owns(page) {
                self.close_page(page);
            }
        }
    }

    fn extra_visible_pages(&self) -> Vec<TabPage> {
        let state = self.inner.state.lock();
        state
            .pages
            .iter()
            .filter(|page| !state.selection.is_selected(page) && page.content().child_visible())
            .cloned()
            .collect()
    }

    fn select_relative(&self, pick: impl FnOnce(usize, usize) -> Option<usize>) -> bool {
        let target = {
            let state = self.inner.state.lock();
            let Some(position) = state.selection.position(&state.pages) else {
                return false;
            };

            match pick(position, state.pages.count()) {
                Some(target) if target != position => state.pages.get(target).clone(),
                _ => return false,
            }
        };

        self.set_selected(Some(&target), true)
    }

    /// Make `page` the selected page.
    ///
    /// With `notify_model` unset the pages model gets no selection diff; used
    /// when the selection is a side effect of an insertion the model already
    /// hears about.
    pub(crate) fn set_selected(&self, page: Option<&TabPage>, notify_model: bool) -> bool {
        let (old, old_position, new_position) = {
            let mut state = self.inner.state.lock();

            if state.selection.selected() == page {
                return false;
            }

            let old_position = state.selection.position(&state.pages);
            let new_position = page.and_then(|page| state.pages.position_of(page));
            let old = state.selection.replace(page.cloned());
            (old, old_position, new_position)
        };

        let mut contains_focus = false;

        if let Some(old) = &old {
            if self.inner.config.restore_focus {
                if let Some(focus) = old.content().focused_element() {
                    contains_focus = true;
                    old.set_last_focus(Some(focus));
                }
            }

            if page.is_some() && !self.inner.config.defer_unmap {
                old.content().set_child_visible(false);
            }

            old.set_selected(false);
        }

        if let Some(page) = page {
            let content = page.content();
            content.set_child_visible(true);

            if contains_focus {
                content.grab_focus(page.last_focus());
            }

            page.set_selected(true);
        }

        tracing::debug!(
            view_id = %self.id(),
            old_position = ?old_position,
            new_position = ?new_position,
            "Selected page changed"
        );

        if notify_model {
            self.model_selection_changed(old_position, new_position);
        }

        self.queue_notify(Deferred::Selection {
            old,
            new: page.cloned(),
        });
        self.queue_notify(Deferred::Property(ViewProperty::SelectedPage));

        true
    }

    /// Insert an unattached `page` at `position` and take over its content
    pub(crate) fn attach(&self, page: &TabPage, position: usize) {
        assert!(
            page.view_id().is_none(),
            "page {} is already attached to a view",
            page.id()
        );

        let transferring = {
            let mut state = self.inner.state.lock();
            state.pages.insert(page.clone(), position);
            state.transfer_count > 0
        };

        page.set_view(Some(self.id()));

        let content = page.content();
        content.set_child_visible(false);
        content.set_parent(Some(self.id()));
        content.set_can_target(!transferring);

        if let Some(parent) = page.parent() {
            if parent.view_id() != Some(self.id()) {
                page.clear_parent();
            }
        }

        tracing::info!(
            view_id = %self.id(),
            page_id = %page.id(),
            position,
            "Page attached"
        );

        self.queue_notify(Deferred::Property(ViewProperty::NPages));
        self.emit(|observer| observer.page_attached(self, page, position));
    }

    /// Remove `page`, moving the selection away from it first. Returns the
    /// position it occupied.
    pub(crate) fn detach(&self, page: &TabPage) -> usize {
        let (fallback, last) = {
            let state = self.inner.state.lock();
            self.position_in(&state, page);
            let fallback = if state.selection.is_selected(page) {
                fallback_selection(&state.pages, page)
            } else {
                None
            };
            (fallback, state.pages.count() == 1)
        };

        if let Some(fallback) = &fallback {
            self.set_selected(Some(fallback), true);
        }

        if last {
            self.set_selected(None, true);
        }

        // Selection observers may have reordered the pages
        let position = {
            let mut state = self.inner.state.lock();
            let position = self.position_in(&state, page);
            state.pages.remove(position);
            position
        };
        release_content(page);

        tracing::info!(
            view_id = %self.id(),
            page_id = %page.id(),
            position,
            "Page detached"
        );

        self.queue_notify(Deferred::Property(ViewProperty::NPages));
        self.emit(|observer| observer.page_detached(self, page, position));
        self.items_changed(position, 1, 0);

        position
    }

    fn insert_page(&self, page: &TabPage, position: usize) {
        self.attach(page, position);

        // The insert diff goes out before the selection it implies
        let _freeze = self.freeze_notify();

        if self.selected_page().is_none() {
            self.set_selected(Some(page), false);
        }

        self.items_changed(position, 0, 1);
    }

    fn create_and_insert(
        &self,
        content: Content,
        parent: Option<&TabPage>,
        position: usize,
    ) -> TabPage {
        {
            let state = self.inner.state.lock();
            assert!(
                !state
                    .pages
                    .iter()
                    .any(|page| same_content(page.content(), &content)),
                "content already belongs to a page of view {}",
                self.id()
            );
            assert!(
                position <= state.pages.count(),
                "insert position {position} out of bounds for {} pages",
                state.pages.count()
            );
        }

        let page = TabPage::new(content, parent);
        self.insert_page(&page, position);
        page
    }
}

impl PartialEq for TabView {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for TabView {}

impl std::fmt::Debug for TabView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("TabView")
            .field("id", &self.inner.id)
            .field("n_pages", &state.pages.count())
            .field("transfer_count", &state.transfer_count)
            .finish()
    }
}
