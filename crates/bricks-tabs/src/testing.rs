//! Shared fixtures for unit tests

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::content::{ContentHandle, FocusId};
use crate::observer::{TabViewObserver, ViewProperty};
use crate::page::TabPage;
use crate::pages::PagesModelObserver;
use crate::transfer::TransferGroup;
use crate::view::{TabView, ViewId};

/// Content that records what the view does to it
pub(crate) struct TestContent {
    name: String,
    visible: AtomicBool,
    can_target: AtomicBool,
    parent: Mutex<Option<ViewId>>,
    focus: Mutex<Option<FocusId>>,
    grabs: Mutex<Vec<Option<FocusId>>>,
}

impl TestContent {
    pub(crate) fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            visible: AtomicBool::new(true),
            can_target: AtomicBool::new(true),
            parent: Mutex::new(None),
            focus: Mutex::new(None),
            grabs: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn can_target(&self) -> bool {
        self.can_target.load(Ordering::SeqCst)
    }

    pub(crate) fn parent(&self) -> Option<ViewId> {
        *self.parent.lock()
    }

    /// Pretend `element` inside this content holds focus
    pub(crate) fn set_focus(&self, element: Option<FocusId>) {
        *self.focus.lock() = element;
    }

    pub(crate) fn grabs(&self) -> Vec<Option<FocusId>> {
        self.grabs.lock().clone()
    }
}

impl ContentHandle for TestContent {
    fn set_child_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    fn child_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn set_can_target(&self, can_target: bool) {
        self.can_target.store(can_target, Ordering::SeqCst);
    }

    fn set_parent(&self, view: Option<ViewId>) {
        *self.parent.lock() = view;
    }

    fn focused_element(&self) -> Option<FocusId> {
        *self.focus.lock()
    }

    fn grab_focus(&self, element: Option<FocusId>) {
        self.grabs.lock().push(element);
        *self.focus.lock() = Some(element.unwrap_or(FocusId(0)));
    }
}

/// Everything a [`Recorder`] can observe, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Attached(TabPage, usize),
    Detached(TabPage, usize),
    Reordered(TabPage, usize),
    Selection(Option<usize>, Option<usize>),
    CloseRequested(TabPage),
    IndicatorActivated(TabPage),
    Property(ViewProperty),
    ItemsChanged(usize, usize, usize),
    ModelSelection(usize, usize),
}

/// Observer for both the view and its pages model
#[derive(Default)]
pub(crate) struct Recorder {
    events: Mutex<Vec<Event>>,
    handle_close: AtomicBool,
}

impl Recorder {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take over close requests instead of letting the view confirm them
    pub(crate) fn set_handle_close(&self, handle: bool) {
        self.handle_close.store(handle, Ordering::SeqCst);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub(crate) fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl TabViewObserver for Recorder {
    fn page_attached(&self, _view: &TabView, page: &TabPage, position: usize) {
        self.push(Event::Attached(page.clone(), position));
    }

    fn page_detached(&self, _view: &TabView, page: &TabPage, position: usize) {
        self.push(Event::Detached(page.clone(), position));
    }

    fn page_reordered(&self, _view: &TabView, page: &TabPage, position: usize) {
        self.push(Event::Reordered(page.clone(), position));
    }

    fn selection_changed(&self, _view: &TabView, old: Option<usize>, new: Option<usize>) {
        self.push(Event::Selection(old, new));
    }

    fn close_page(&self, _view: &TabView, page: &TabPage) -> bool {
        self.push(Event::CloseRequested(page.clone()));
        self.handle_close.load(Ordering::SeqCst)
    }

    fn indicator_activated(&self, _view: &TabView, page: &TabPage) {
        self.push(Event::IndicatorActivated(page.clone()));
    }

    fn property_changed(&self, _view: &TabView, property: ViewProperty) {
        self.push(Event::Property(property));
    }
}

impl PagesModelObserver for Recorder {
    fn items_changed(&self, position: usize, removed: usize, added: usize) {
        self.push(Event::ItemsChanged(position, removed, added));
    }

    fn selection_changed(&self, position: usize, n_items: usize) {
        self.push(Event::ModelSelection(position, n_items));
    }
}

/// A view in its own group with a recorder on both the view and its pages model
pub(crate) fn recorded_view() -> (TabView, Arc<Recorder>) {
    recorded_view_in(&TransferGroup::new())
}

pub(crate) fn recorded_view_in(group: &TransferGroup) -> (TabView, Arc<Recorder>) {
    let view = TabView::new(group);
    let recorder = Recorder::new();
    view.connect(recorder.clone());
    view.pages().connect(recorder.clone());
    (view, recorder)
}

/// Append one page per title
pub(crate) fn append_pages(view: &TabView, titles: &[&str]) -> Vec<TabPage> {
    titles
        .iter()
        .map(|title| {
            let page = view.append(TestContent::new(title));
            page.set_title(*title);
            page
        })
        .collect()
}
