//! Bricks Core
//!
//! Application-facing layer around the tab view: configuration, logging setup
//! and the workspace of top-level windows that exchange tabs.

mod config;
mod error;
mod workspace;

pub use config::Config;
pub use error::CoreError;
pub use workspace::Workspace;

// Re-export the tab view model
pub use bricks_tabs::{
    fallback_selection, AccessibleTree, Content, ContentHandle, FocusId, HandlerId, Icon,
    NotifyFreezeGuard, PageCollection, PageId, PageProperty, PagesModelObserver,
    SelectionTracker, TabDrag, TabError, TabPage, TabPages, TabView, TabViewConfig,
    TabViewObserver, TransferGroup, ViewId, ViewProperty, WindowFactory,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `config.log_filter`. Calling this again
/// once a subscriber is installed has no effect.
pub fn init_logging(config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
        tracing::debug!("Logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        let config = Config::default();
        init_logging(&config);
        init_logging(&config);
    }
}
