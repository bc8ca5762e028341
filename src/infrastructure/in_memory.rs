use crate::domain::ports::{LookupClient, LookupResponse};
use crate::error::LookupError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

/// A lookup client answering from an in-memory table.
///
/// Accounts not in the table resolve to `NotFound`. Routing codes marked
/// unreachable fail with a transport error. Every call is recorded in issue
/// order. Cloning shares the table and the call log.
#[derive(Default, Clone)]
pub struct ScriptedLookupClient {
    accounts: Arc<RwLock<HashMap<(String, String), String>>>,
    unreachable: Arc<RwLock<HashSet<String>>>,
    gates: Arc<RwLock<HashMap<String, Arc<Notify>>>>,
    calls: Arc<RwLock<Vec<(String, String)>>>,
}

impl ScriptedLookupClient {
    /// Creates a client that knows no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ScriptedLookupClientBuilder {
        ScriptedLookupClientBuilder::default()
    }

    pub async fn add_account(&self, account_number: &str, routing_code: &str, name: &str) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(
            (account_number.to_string(), routing_code.to_string()),
            name.to_string(),
        );
    }

    /// Makes a previously unreachable routing code answer again.
    pub async fn restore(&self, routing_code: &str) {
        let mut codes = self.unreachable.write().await;
        codes.remove(routing_code);
    }

    /// Every `(account_number, routing_code)` pair looked up so far.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.read().await.clone()
    }

    pub async fn routing_codes_called(&self) -> Vec<String> {
        let calls = self.calls.read().await;
        calls.iter().map(|(_, code)| code.clone()).collect()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

/// Fills the client's tables before any clone can observe them.
#[derive(Default)]
pub struct ScriptedLookupClientBuilder {
    accounts: HashMap<(String, String), String>,
    unreachable: HashSet<String>,
    gates: HashMap<String, Arc<Notify>>,
}

impl ScriptedLookupClientBuilder {
    pub fn with_account(mut self, account_number: &str, routing_code: &str, name: &str) -> Self {
        self.accounts.insert(
            (account_number.to_string(), routing_code.to_string()),
            name.to_string(),
        );
        self
    }

    pub fn with_unreachable(mut self, routing_code: &str) -> Self {
        self.unreachable.insert(routing_code.to_string());
        self
    }

    /// Lookups for `account_number` wait for `gate` to be notified before answering.
    pub fn with_gate(mut self, account_number: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(account_number.to_string(), gate);
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len() + self.unreachable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn build(self) -> ScriptedLookupClient {
        ScriptedLookupClient {
            accounts: Arc::new(RwLock::new(self.accounts)),
            unreachable: Arc::new(RwLock::new(self.unreachable)),
            gates: Arc::new(RwLock::new(self.gates)),
            calls: Arc::default(),
        }
    }
}

#[async_trait]
impl LookupClient for ScriptedLookupClient {
    async fn resolve(
        &self,
        account_number: &str,
        routing_code: &str,
    ) -> Result<LookupResponse, LookupError> {
        {
            let mut calls = self.calls.write().await;
            calls.push((account_number.to_string(), routing_code.to_string()));
        }

        let gate = self.gates.read().await.get(account_number).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.unreachable.read().await.contains(routing_code) {
            return Err(LookupError::Unavailable(format!(
                "bank {routing_code} unreachable"
            )));
        }

        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(&(account_number.to_string(), routing_code.to_string()))
            .cloned()
            .map_or(LookupResponse::NotFound, LookupResponse::Resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_lookup_answers() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .with_unreachable("044")
            .build();

        assert_eq!(
            client.resolve("0123456789", "058").await.unwrap(),
            LookupResponse::Resolved("JOHN DOE".to_string())
        );
        assert_eq!(
            client.resolve("0123456789", "070").await.unwrap(),
            LookupResponse::NotFound
        );
        assert!(matches!(
            client.resolve("0123456789", "044").await,
            Err(LookupError::Unavailable(_))
        ));
        assert_eq!(client.routing_codes_called().await, vec!["058", "070", "044"]);
    }

    #[tokio::test]
    async fn test_built_client_keeps_every_scripted_row() {
        let script = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .with_account("0123456789", "044", "JOHN DOE")
            .with_unreachable("070");
        assert_eq!(script.len(), 3);

        let client = script.build();
        let shared = client.clone();
        assert_eq!(
            shared.resolve("0123456789", "044").await.unwrap(),
            LookupResponse::Resolved("JOHN DOE".to_string())
        );
        assert!(shared.resolve("0123456789", "070").await.is_err());
        assert_eq!(client.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let client = ScriptedLookupClient::new();
        let shared = client.clone();
        client.add_account("1111111111", "011", "ADA OBI").await;

        assert_eq!(
            shared.resolve("1111111111", "011").await.unwrap(),
            LookupResponse::Resolved("ADA OBI".to_string())
        );
        assert_eq!(
            client.calls().await,
            vec![("1111111111".to_string(), "011".to_string())]
        );
    }

    #[tokio::test]
    async fn test_gate_holds_answer_until_notified() {
        let gate = Arc::new(Notify::new());
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .with_gate("0123456789", Arc::clone(&gate))
            .build();

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.resolve("0123456789", "058").await.unwrap() }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        gate.notify_one();
        assert_eq!(
            pending.await.unwrap(),
            LookupResponse::Resolved("JOHN DOE".to_string())
        );
    }
}
