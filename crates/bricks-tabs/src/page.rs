//! Tab pages
//!
//! A page wraps one content handle plus the metadata a tab bar displays.
//! Pages are shared handles: the view holding a page, a drag in progress and
//! any external owner all keep it alive, and it is destroyed once the last
//! handle goes away.
//!
//! The parent relation is non-owning. When a parent page is destroyed its
//! children are re-parented to the grandparent, so parent chains collapse one
//! level at a time instead of being cut.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use uuid::Uuid;

use crate::content::{Content, FocusId};
use crate::observer::HandlerId;
use crate::view::ViewId;

/// Stable identity of a page for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named icon
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Icon(String);

impl Icon {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Page properties reported through [`TabPage::connect_notify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageProperty {
    Parent,
    Selected,
    Title,
    Tooltip,
    Icon,
    Loading,
    IndicatorIcon,
    IndicatorTooltip,
    IndicatorActivatable,
    NeedsAttention,
    Keyword,
}

impl PageProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageProperty::Parent => "parent",
            PageProperty::Selected => "selected",
            PageProperty::Title => "title",
            PageProperty::Tooltip => "tooltip",
            PageProperty::Icon => "icon",
            PageProperty::Loading => "loading",
            PageProperty::IndicatorIcon => "indicator-icon",
            PageProperty::IndicatorTooltip => "indicator-tooltip",
            PageProperty::IndicatorActivatable => "indicator-activatable",
            PageProperty::NeedsAttention => "needs-attention",
            PageProperty::Keyword => "keyword",
        }
    }
}

impl std::fmt::Display for PageProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

type NotifyCallback = Arc<dyn Fn(&TabPage, PageProperty) + Send + Sync>;

#[derive(Default)]
struct PageState {
    parent: Option<Weak<PageInner>>,
    /// Owning view, `None` while unattached
    view: Option<ViewId>,
    selected: bool,
    closing: bool,
    last_focus: Option<FocusId>,
    title: String,
    tooltip: Option<String>,
    icon: Option<Icon>,
    loading: bool,
    indicator_icon: Option<Icon>,
    indicator_tooltip: String,
    indicator_activatable: bool,
    needs_attention: bool,
    keyword: Option<String>,
}

pub(crate) struct PageInner {
    id: PageId,
    content: Content,
    state: RwLock<PageState>,
    /// Pages whose parent is this page
    children: Mutex<Vec<Weak<PageInner>>>,
    handlers: RwLock<Vec<(HandlerId, NotifyCallback)>>,
}

impl Drop for PageInner {
    fn drop(&mut self) {
        let grandparent = self
            .state
            .get_mut()
            .parent
            .take()
            .and_then(|parent| parent.upgrade());

        if let Some(grandparent) = &grandparent {
            let this: *const PageInner = self;
            grandparent
                .children
                .lock()
                .retain(|child| !std::ptr::eq(child.as_ptr(), this));
        }

        let grandparent = grandparent.map(|inner| TabPage { inner });

        for child in self.children.get_mut().drain(..) {
            if let Some(inner) = child.upgrade() {
                TabPage { inner }.parent_destroyed(grandparent.as_ref());
            }
        }
    }
}

/// Handle to a tab page. Clones share the same page; equality is identity.
#[derive(Clone)]
pub struct TabPage {
    inner: Arc<PageInner>,
}

impl TabPage {
    pub(crate) fn new(content: Content, parent: Option<&TabPage>) -> Self {
        let page = Self {
            inner: Arc::new(PageInner {
                id: PageId::new(),
                content,
                state: RwLock::new(PageState::default()),
                children: Mutex::new(Vec::new()),
                handlers: RwLock::new(Vec::new()),
            }),
        };

        if let Some(parent) = parent {
            parent.link_child(&page);
            page.inner.state.write().parent = Some(Arc::downgrade(&parent.inner));
        }

        page
    }

    pub fn id(&self) -> PageId {
        self.inner.id
    }

    /// The content this page wraps, fixed at creation
    pub fn content(&self) -> &Content {
        &self.inner.content
    }

    pub fn parent(&self) -> Option<TabPage> {
        self.inner
            .state
            .read()
            .parent
            .as_ref()
            .and_then(|parent| parent.upgrade())
            .map(|inner| TabPage { inner })
    }

    /// Whether `ancestor` is this page or appears in its parent chain
    pub fn is_descendant_of(&self, ancestor: &TabPage) -> bool {
        let mut page = Some(self.clone());

        while let Some(current) = page {
            if &current == ancestor {
                return true;
            }
            page = current.parent();
        }

        false
    }

    /// The view this page is attached to
    pub fn view_id(&self) -> Option<ViewId> {
        self.inner.state.read().view
    }

    pub fn is_selected(&self) -> bool {
        self.inner.state.read().selected
    }

    /// Whether a close request for this page is awaiting its outcome
    pub fn is_closing(&self) -> bool {
        self.inner.state.read().closing
    }

    pub fn title(&self) -> String {
        self.inner.state.read().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.update(PageProperty::Title, |state| replace(&mut state.title, title));
    }

    pub fn tooltip(&self) -> Option<String> {
        self.inner.state.read().tooltip.clone()
    }

    pub fn set_tooltip(&self, tooltip: Option<String>) {
        self.update(PageProperty::Tooltip, |state| {
            replace(&mut state.tooltip, tooltip)
        });
    }

    pub fn icon(&self) -> Option<Icon> {
        self.inner.state.read().icon.clone()
    }

    pub fn set_icon(&self, icon: Option<Icon>) {
        self.update(PageProperty::Icon, |state| replace(&mut state.icon, icon));
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().loading
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(PageProperty::Loading, |state| {
            replace(&mut state.loading, loading)
        });
    }

    pub fn indicator_icon(&self) -> Option<Icon> {
        self.inner.state.read().indicator_icon.clone()
    }

    pub fn set_indicator_icon(&self, icon: Option<Icon>) {
        self.update(PageProperty::IndicatorIcon, |state| {
            replace(&mut state.indicator_icon, icon)
        });
    }

    pub fn indicator_tooltip(&self) -> String {
        self.inner.state.read().indicator_tooltip.clone()
    }

    pub fn set_indicator_tooltip(&self, tooltip: impl Into<String>) {
        let tooltip = tooltip.into();
        self.update(PageProperty::IndicatorTooltip, |state| {
            replace(&mut state.indicator_tooltip, tooltip)
        });
    }

    pub fn is_indicator_activatable(&self) -> bool {
        self.inner.state.read().indicator_activatable
    }

    pub fn set_indicator_activatable(&self, activatable: bool) {
        self.update(PageProperty::IndicatorActivatable, |state| {
            replace(&mut state.indicator_activatable, activatable)
        });
    }

    pub fn needs_attention(&self) -> bool {
        self.inner.state.read().needs_attention
    }

    pub fn set_needs_attention(&self, needs_attention: bool) {
        self.update(PageProperty::NeedsAttention, |state| {
            replace(&mut state.needs_attention, needs_attention)
        });
    }

    /// Search keyword, used by tab overviews to match the page
    pub fn keyword(&self) -> Option<String> {
        self.inner.state.read().keyword.clone()
    }

    pub fn set_keyword(&self, keyword: Option<String>) {
        self.update(PageProperty::Keyword, |state| {
            replace(&mut state.keyword, keyword)
        });
    }

    /// Call `callback` whenever a property of this page changes
    pub fn connect_notify<F>(&self, callback: F) -> HandlerId
    where
        F: Fn(&TabPage, PageProperty) + Send + Sync + 'static,
    {
        let id = HandlerId::next();
        self.inner.handlers.write().push((id, Arc::new(callback)));
        id
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.inner.handlers.write();
        let before = handlers.len();
        handlers.retain(|(handler, _)| *handler != id);
        handlers.len() != before
    }

    pub(crate) fn set_view(&self, view: Option<ViewId>) {
        self.inner.state.write().view = view;
    }

    pub(crate) fn set_selected(&self, selected: bool) {
        self.update(PageProperty::Selected, |state| {
            replace(&mut state.selected, selected)
        });
    }

    pub(crate) fn set_closing(&self, closing: bool) {
        self.inner.state.write().closing = closing;
    }

    pub(crate) fn last_focus(&self) -> Option<FocusId> {
        self.inner.state.read().last_focus
    }

    pub(crate) fn set_last_focus(&self, focus: Option<FocusId>) {
        self.inner.state.write().last_focus = focus;
    }

    /// Drops the parent relation; used when a page lands in a view that does
    /// not hold its parent.
    pub(crate) fn clear_parent(&self) {
        let Some(parent) = self.inner.state.write().parent.take() else {
            return;
        };

        if let Some(parent) = parent.upgrade() {
            let this = Arc::as_ptr(&self.inner);
            parent
                .children
                .lock()
                .retain(|child| !std::ptr::eq(child.as_ptr(), this));
        }

        self.notify(PageProperty::Parent);
    }

    fn parent_destroyed(&self, grandparent: Option<&TabPage>) {
        if let Some(grandparent) = grandparent {
            grandparent.link_child(self);
        }

        self.inner.state.write().parent = grandparent.map(|page| Arc::downgrade(&page.inner));

        tracing::debug!(
            page_id = %self.id(),
            parent_id = ?grandparent.map(TabPage::id),
            "Parent page destroyed"
        );

        self.notify(PageProperty::Parent);
    }

    fn link_child(&self, child: &TabPage) {
        let mut children = self.inner.children.lock();
        children.retain(|child| child.strong_count() > 0);
        children.push(Arc::downgrade(&child.inner));
    }

    fn update(&self, property: PageProperty, apply: impl FnOnce(&mut PageState) -> bool) {
        let changed = apply(&mut self.inner.state.write());

        if changed {
            self.notify(property);
        }
    }

    fn notify(&self, property: PageProperty) {
        // Collect first so handlers run without the lock held
        let handlers: Vec<NotifyCallback> = self
            .inner
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(self, property);
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

impl PartialEq for TabPage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for TabPage {}

impl std::hash::Hash for TabPage {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl std::fmt::Debug for TabPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("TabPage")
            .field("id", &self.inner.id)
            .field("title", &state.title)
            .field("view", &state.view)
            .field("selected", &state.selected)
            .finish()
    }
}
