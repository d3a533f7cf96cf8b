use std::fmt;
use std::sync::Arc;

/// Lifecycle of a single cached query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Uninitialized,
    Loading,
    Success,
    Error,
}

/// Snapshot of one cache entry as seen by subscribers.
///
/// `data` survives a failed refetch; `error` is cleared by the next success.
pub struct QueryState<V, E> {
    pub status: QueryStatus,
    pub data: Option<V>,
    pub error: Option<Arc<E>>,
}

impl<V, E> QueryState<V, E> {
    pub fn uninitialized() -> Self {
        Self {
            status: QueryStatus::Uninitialized,
            data: None,
            error: None,
        }
    }

    /// First load: a request is outstanding and there is nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_none()
    }

    /// Any request is outstanding, including background refetches.
    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Success or error; the entry is not waiting on the network.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, QueryStatus::Success | QueryStatus::Error)
    }
}

impl<V: Clone, E> Clone for QueryState<V, E> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<V, E> Default for QueryState<V, E> {
    fn default() -> Self {
        Self::uninitialized()
    }
}

impl<V: fmt::Debug, E: fmt::Debug> fmt::Debug for QueryState<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("status", &self.status)
            .field("data", &self.data)
            .field("error", &self.error)
            .finish()
    }
}
