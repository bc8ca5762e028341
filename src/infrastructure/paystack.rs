use crate::config::LookupConfig;
use crate::domain::ports::{LookupClient, LookupResponse};
use crate::error::{LookupError, VaultError};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ResolveBody {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    data: Option<ResolvedAccount>,
}

#[derive(Debug, Deserialize)]
struct ResolvedAccount {
    #[serde(default)]
    account_name: Option<String>,
}

/// Account-name lookup over the Paystack `bank/resolve` endpoint.
///
/// The service answers unknown accounts with a 4xx status and a JSON body
/// whose `status` is false, so the body decides the response, not the HTTP
/// status code.
#[derive(Clone)]
pub struct PaystackLookupClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PaystackLookupClient {
    pub fn new(config: &LookupConfig) -> Result<Self, VaultError> {
        let token = config
            .token
            .as_ref()
            .ok_or_else(|| {
                VaultError::ConfigError(
                    "lookup token missing; set GVAULT_LOOKUP_TOKEN or pass --token".to_string(),
                )
            })?
            .expose()
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(LookupError::from)?;

        Ok(Self {
            http,
            endpoint: format!("{}/bank/resolve", config.base_url.trim_end_matches('/')),
            token,
        })
    }
}

#[async_trait]
impl LookupClient for PaystackLookupClient {
    async fn resolve(
        &self,
        account_number: &str,
        routing_code: &str,
    ) -> Result<LookupResponse, LookupError> {
        let body = self
            .http
            .get(&self.endpoint)
            .query(&[("account_number", account_number), ("bank_code", routing_code)])
            .bearer_auth(&self.token)
            .send()
            .await?
            .text()
            .await?;

        interpret_body(&body)
    }
}

fn interpret_body(body: &str) -> Result<LookupResponse, LookupError> {
    let parsed: ResolveBody = serde_json::from_str(body)?;
    let name = parsed
        .data
        .and_then(|data| data.account_name)
        .filter(|name| !name.trim().is_empty());

    match (parsed.status, name) {
        (true, Some(name)) => Ok(LookupResponse::Resolved(name)),
        _ => Ok(LookupResponse::NotFound),
    }
}
