use std::sync::{Arc, Mutex, PoisonError};

use crate::models::Location;

/// Navigator Contract
///
/// Moves the current view to another location. Fire-and-forget: the guard never
/// observes a result, so implementations must not fail loudly.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, location: &Location);
}

/// NavigatorState
///
/// Guards hold navigators behind an `Arc` so every boundary of a layout stack can
/// share one without any of them owning it.
pub type NavigatorState = Arc<dyn Navigator>;

/// RecordingNavigator
///
/// Remembers every location it was asked to visit, in order.
///
/// The HTTP boundary uses one per request and turns the last recorded visit into a
/// `303 See Other`; tests use it to count redirects.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Location>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Location> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Removes and returns the most recent visit, if any.
    pub fn take_last(&self) -> Option<Location> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, location: &Location) {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.clone());
    }
}
