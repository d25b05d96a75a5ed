//! Tab view error types
//!
//! Only environment-dependent failures live here. Broken caller contracts
//! (foreign pages, out-of-range positions, unbalanced close handshakes) panic
//! at the point of detection instead.

use thiserror::Error;

use crate::view::ViewId;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("No window factory installed on view {0}")]
    NoWindowFactory(ViewId),

    #[error("Window factory of view {0} did not create a view")]
    WindowFactoryDeclined(ViewId),

    #[error("View {view} belongs to a different transfer group")]
    ForeignTransferGroup { view: ViewId },

    #[error("Invalid tab view configuration: {0}")]
    Config(#[from] serde_json::Error),
}
