//! Bricks Tab View
//!
//! The session model behind a tab view: an ordered collection of pages, each
//! wrapping one piece of externally owned content, with a single selection,
//! a two-step close handshake, and transfer of pages between views that share
//! a transfer group (dragging a tab into another window).
//!
//! Rendering, layout and input handling are someone else's job. The model
//! drives content only through [`ContentHandle`] and reports every change to
//! [`TabViewObserver`]s and to the positional [`TabPages`] model.

mod accessible;
mod collection;
mod config;
mod content;
mod error;
mod observer;
mod page;
mod pages;
mod selection;
mod transfer;
mod view;

#[cfg(test)]
mod testing;

pub use accessible::AccessibleTree;
pub use collection::PageCollection;
pub use config::TabViewConfig;
pub use content::{Content, ContentHandle, FocusId};
pub use error::TabError;
pub use observer::{HandlerId, NotifyFreezeGuard, TabViewObserver, ViewProperty};
pub use page::{Icon, PageId, PageProperty, TabPage};
pub use pages::{PagesModelObserver, TabPages};
pub use selection::{fallback_selection, SelectionTracker};
pub use transfer::{TabDrag, TransferGroup, WindowFactory};
pub use view::{TabView, ViewId};

pub type Result<T> = std::result::Result<T, TabError>;
