//! View models of the pokedex front end.
//!
//! Views are plain structs mutated through `&mut self`.
//! Loading data is split in two steps so that no view is borrowed while a
//! request is in flight:
//!
//! 1. the view issues a request value (e.g. [catalog_browser::PageRequest])
//!    tagged with a [CancellationToken] and cancels the token of the request
//!    it supersedes
//! 2. the request is run against a client and its [Outcome] is applied back
//!    to the view, which drops it if its token was cancelled in the meantime
//!
//! Mutations (create, update, delete) are awaited in place and report
//! failures to [Alerts].

use tokio_util::sync::CancellationToken;
use tracing::trace;

pub mod catalog_browser;
pub mod collection_browser;
pub mod collection_form;
pub mod detail_viewer;
pub mod id_index;

/// Receives the messages of failed mutations,
/// which the front end shows as blocking alerts.
pub trait Alerts {
    fn alert(&self, message: &str);
}

impl<F: Fn(&str)> Alerts for F {
    fn alert(&self, message: &str) {
        self(message)
    }
}

/// The result of a request, tagged with the token of the view activation
/// that issued it.
#[derive(Debug)]
pub struct Outcome<T> {
    token: CancellationToken,
    result: T,
}

impl<T> Outcome<T> {
    pub(crate) fn new(token: CancellationToken, result: T) -> Self {
        Self { token, result }
    }

    /// Whether the view deactivated or issued a newer request since.
    pub fn is_stale(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The result, unless the outcome is stale.
    pub(crate) fn into_current(self) -> Option<T> {
        if self.is_stale() {
            trace!("dropping stale outcome");
            return None;
        }
        Some(self.result)
    }
}

/// Tracks the token of a view's in-flight request.
#[derive(Debug, Default)]
pub(crate) struct Activation {
    current: Option<CancellationToken>,
}

impl Activation {
    /// Cancel the in-flight request, if any, and return the token of its
    /// successor.
    pub(crate) fn renew(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renew_cancels_previous_token() {
        let mut activation = Activation::default();
        let first = activation.renew();
        let second = activation.renew();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        activation.cancel();
        assert!(second.is_cancelled());
    }

    #[test]
    fn stale_outcome_is_dropped() {
        let mut activation = Activation::default();
        let outcome = Outcome::new(activation.renew(), 1);
        assert!(!outcome.is_stale());

        activation.cancel();
        assert!(outcome.is_stale());
        assert_eq!(outcome.into_current(), None);
    }
}
