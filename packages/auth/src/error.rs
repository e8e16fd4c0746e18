use api::ProviderError;
use store::StoreError;

/// Why a workflow failed after passing validation. Rejected input is
/// reported through [`WorkflowStatus::Rejected`](crate::WorkflowStatus::Rejected).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("provider rejected the request: {0}")]
    Provider(#[from] ProviderError),

    /// The provider call succeeded but the data store write after it did not.
    #[error("secondary write failed: {0}")]
    SecondaryWrite(StoreError),

    /// A workflow whose only external call is a data store write.
    #[error("data store write failed: {0}")]
    Store(#[from] StoreError),

    #[error("no user is signed in")]
    NotSignedIn,
}

impl AuthError {
    pub fn provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }
}
