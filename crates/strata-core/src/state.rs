//! Client initialization state

use std::fmt;

/// Bootstrap state of a client
///
/// Transitions only through the initialization controller:
/// NotReady -> Loading -> Ready, with Loading -> NotReady on failure
/// and any state -> NotReady on reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum InitState {
    /// No catalog loaded; generated classes and namespace are empty
    #[default]
    NotReady,
    /// A signature load is in flight
    Loading,
    /// Catalog loaded and every bootstrap hook has run
    Ready,
}

impl InitState {
    /// Stable lowercase name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            InitState::NotReady => "not_ready",
            InitState::Loading => "loading",
            InitState::Ready => "ready",
        }
    }

    #[inline]
    pub fn is_ready(self) -> bool {
        self == InitState::Ready
    }

    #[inline]
    pub fn is_loading(self) -> bool {
        self == InitState::Loading
    }
}

impl fmt::Display for InitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
