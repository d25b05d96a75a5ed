//! Window workspace
//!
//! Each top-level window hosts one tab view. All views of a workspace share a
//! transfer group, and each view's window factory opens another window in the
//! same workspace, so a tab dropped outside every window lands in a new one.

use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use bricks_tabs::{TabView, TransferGroup, ViewId};

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

struct WorkspaceInner {
    config: Config,
    group: TransferGroup,
    /// Open windows in the order they were opened
    windows: RwLock<Vec<TabView>>,
}

/// Registry of open windows. Clones share the same workspace.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

impl Workspace {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(WorkspaceInner {
                config,
                group: TransferGroup::new(),
                windows: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The transfer group shared by all windows
    pub fn group(&self) -> &TransferGroup {
        &self.inner.group
    }

    /// Open a new, empty window
    pub fn open_window(&self) -> TabView {
        let view = TabView::with_config(&self.inner.group, self.inner.config.tabs.clone());

        let workspace = Arc::downgrade(&self.inner);
        view.set_window_factory(move |_| Self::upgrade(&workspace).map(|ws| ws.open_window()));

        let count = {
            let mut windows = self.inner.windows.write();
            windows.push(view.clone());
            windows.len()
        };

        tracing::info!(view_id = %view.id(), window_count = count, "Opened window");

        view
    }

    pub fn windows(&self) -> Vec<TabView> {
        self.inner.windows.read().clone()
    }

    pub fn window(&self, id: ViewId) -> Result<TabView> {
        self.inner
            .windows
            .read()
            .iter()
            .find(|view| view.id() == id)
            .cloned()
            .ok_or_else(|| CoreError::WindowNotFound(id.to_string()))
    }

    pub fn window_count(&self) -> usize {
        self.inner.windows.read().len()
    }

    /// Forget a window. Its pages are released once no other handle keeps the
    /// view alive.
    pub fn close_window(&self, id: ViewId) -> Result<()> {
        let view = {
            let mut windows = self.inner.windows.write();
            let position = windows
                .iter()
                .position(|view| view.id() == id)
                .ok_or_else(|| CoreError::WindowNotFound(id.to_string()))?;
            windows.remove(position)
        };

        tracing::info!(view_id = %id, n_pages = view.n_pages(), "Closed window");

        Ok(())
    }

    fn upgrade(inner: &Weak<WorkspaceInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("config", &self.inner.config)
            .field("windows", &self.window_count())
            .finish()
    }
}
