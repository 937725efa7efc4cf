//! Client-side behaviors of the card pages: background form submission that
//! retires a card once the server acknowledges it, and query parameter
//! toggling for the list filters.

pub mod config;
pub mod dom;
pub mod form_data;
pub mod navigation;
pub mod submit;
pub mod toggle;
pub mod transition;
pub mod transport;

use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

pub use config::{load_settings, ClientSettings};
pub use dom::{Document, DomError, NodeId};
pub use navigation::{MemoryNavigator, Navigator};
pub use submit::{SubmitEvent, SubmitInterceptor, SubmitOutcome};
pub use toggle::{toggle_query_param, QueryToggle, ToggleMode};
pub use transition::RowTransition;
pub use transport::{HttpSubmitTransport, SubmitResponse, SubmitTransport};

/// Interceptor posting to the configured endpoint over HTTP. Forms still
/// need to be attached.
pub fn http_interceptor(
    settings: &ClientSettings,
    document: Arc<Mutex<Document>>,
) -> Result<SubmitInterceptor, url::ParseError> {
    let transport = HttpSubmitTransport::new(settings.submit_url()?);
    Ok(SubmitInterceptor::new(
        document,
        Arc::new(transport),
        RowTransition::from_settings(settings),
    ))
}

/// Query toggle over `navigator` using the configured mode.
pub fn query_toggle<N: Navigator>(settings: &ClientSettings, navigator: N) -> QueryToggle<N> {
    QueryToggle::new(navigator, settings.toggle_mode)
}

/// Toggle bound to an in-memory location starting at `start`.
pub fn memory_toggle(settings: &ClientSettings, start: Url) -> QueryToggle<MemoryNavigator> {
    query_toggle(settings, MemoryNavigator::new(start))
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
