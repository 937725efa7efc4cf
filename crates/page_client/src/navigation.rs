use std::sync::{Mutex, MutexGuard};

use tracing::info;
use url::Url;

/// Port for the page location. `navigate` is a full navigation, not a
/// history entry pushed in place.
pub trait Navigator: Send + Sync {
    fn current_url(&self) -> Url;
    fn navigate(&self, url: Url);
}

#[derive(Debug)]
struct Location {
    current: Url,
    visited: Vec<Url>,
}

/// Keeps the location in memory and records every navigation in order.
#[derive(Debug)]
pub struct MemoryNavigator {
    location: Mutex<Location>,
}

impl MemoryNavigator {
    pub fn new(start: Url) -> Self {
        Self {
            location: Mutex::new(Location {
                current: start,
                visited: Vec::new(),
            }),
        }
    }

    pub fn history(&self) -> Vec<Url> {
        self.lock().visited.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Location> {
        self.location
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        self.lock().current.clone()
    }

    fn navigate(&self, url: Url) {
        info!(url = %url, "navigating");
        let mut location = self.lock();
        location.visited.push(url.clone());
        location.current = url;
    }
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn current_url(&self) -> Url {
        (**self).current_url()
    }

    fn navigate(&self, url: Url) {
        (**self).navigate(url)
    }
}
