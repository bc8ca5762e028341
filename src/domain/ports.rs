use crate::error::LookupError;
use async_trait::async_trait;
use std::sync::Arc;

/// Answer of the name-resolution service for one (account, bank) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    Resolved(String),
    NotFound,
}

/// Read-only account-name lookup against an external service.
///
/// Implementations own their timeout and retry policy; callers only see a
/// response or a transport error.
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn resolve(
        &self,
        account_number: &str,
        routing_code: &str,
    ) -> Result<LookupResponse, LookupError>;
}

pub type LookupClientRef = Arc<dyn LookupClient>;
