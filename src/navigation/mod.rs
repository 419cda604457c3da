// Location handling shared by the wizard and the marketplace pages

pub mod bridge;
pub mod location;
pub mod query;

use thiserror::Error;

pub use bridge::{has_step_in_url, update_query_step, HistoryListener, UrlBridge, WIZARD_ROOT};
pub use location::{Location, MemoryHistory, NavigationChange};
pub use query::{parse_admin_url, Query};

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("invalid admin url {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
}
