//! Correlation identifier for one HTTP request.
//!
//! [`crate::Trace`] installs a fresh id in task-local storage for every
//! request. Domain errors read it when they are built, so an error body and
//! the log lines for the same request share a value. Work moved onto a
//! spawned task loses the id unless it is re-entered with [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    pub(crate) static TRACE_ID: TraceId;
}

/// UUID naming a single request.
///
/// # Examples
/// ```
/// use recipe_backend::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id: TraceId = "6f1c1d0e-8a57-4b0f-9d2a-2f0f5c3b9e11".parse().expect("uuid");
/// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id of the request being served, or `None` outside a request.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `work` with `id` as the current trace id.
    pub async fn scope<F: Future>(id: TraceId, work: F) -> F::Output {
        TRACE_ID.scope(id, work).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_id() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();

        let seen = TraceId::scope(outer, async move {
            let nested = TraceId::scope(inner, async { TraceId::current() }).await;
            (TraceId::current(), nested)
        })
        .await;

        assert_eq!(seen, (Some(outer), Some(inner)));
    }

    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_the_id() {
        let id = TraceId::generate();
        let seen = TraceId::scope(id, async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("join")
        })
        .await;
        assert_eq!(seen, None);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let id = TraceId::generate();
        assert_eq!(id.to_string().parse::<TraceId>().expect("parse"), id);
        assert!("not-a-uuid".parse::<TraceId>().is_err());
    }
}
