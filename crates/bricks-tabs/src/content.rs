//! Content handles
//!
//! A page wraps exactly one piece of externally owned UI content. The tab view
//! never looks inside it: it only toggles visibility, parenting and pointer
//! targeting, and asks where focus is so it can be restored later.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::view::ViewId;

/// Identifies a focusable element inside a piece of content.
///
/// The tab view stores it without owning the element. Implementations of
/// [`ContentHandle::grab_focus`] must cope with ids whose element is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FocusId(pub u64);

/// The narrow interface the tab view uses to drive hosted content.
///
/// Implementations must not call back into the owning view.
pub trait ContentHandle: Send + Sync {
    /// Show or hide the content inside its view
    fn set_child_visible(&self, visible: bool);

    fn child_visible(&self) -> bool;

    /// Allow or refuse direct pointer interaction
    fn set_can_target(&self, _can_target: bool) {}

    /// The view now parenting this content, `None` once released
    fn set_parent(&self, _view: Option<ViewId>) {}

    /// The element inside this content that currently holds focus, if any
    fn focused_element(&self) -> Option<FocusId> {
        None
    }

    /// Focus `element`, or move focus into the content when `None`
    fn grab_focus(&self, _element: Option<FocusId>) {}
}

pub type Content = Arc<dyn ContentHandle>;

pub(crate) fn same_content(a: &Content, b: &Content) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
