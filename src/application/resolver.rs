use crate::domain::bank::{BankDirectory, BankEntry};
use crate::domain::ports::{LookupClient, LookupResponse};
use crate::domain::resolution::{ResolutionOutcome, ResolutionRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Monotonic run counter shared by every run of one logical session.
///
/// Starting a new run (or invalidating the current one) bumps the counter, so
/// any token captured earlier stops being current.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    counter: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes every outstanding token and returns a fresh one.
    pub fn begin(&self) -> RunToken {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken {
            counter: Arc::clone(&self.counter),
            id,
        }
    }

    /// Supersedes every outstanding token without starting a run.
    pub fn invalidate(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Identity of one resolution run.
#[derive(Debug, Clone)]
pub struct RunToken {
    counter: Arc<AtomicU64>,
    id: u64,
}

impl RunToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.id
    }
}

/// Decides which banks to query for an account number and how to read the
/// answers.
///
/// With a selected bank the policy issues exactly one lookup. Without one it
/// walks the directory in order and stops at the first bank that knows the
/// account. Lookup errors never escape: they become outcome variants, or are
/// skipped during a directory scan.
pub struct ResolutionPolicy<'a> {
    directory: &'a BankDirectory,
    client: &'a dyn LookupClient,
}

impl<'a> ResolutionPolicy<'a> {
    pub fn new(directory: &'a BankDirectory, client: &'a dyn LookupClient) -> Self {
        Self { directory, client }
    }

    /// Runs the policy for `request`.
    ///
    /// Returns `None` when `token` stops being current before the run finishes;
    /// a stale run issues no further lookups.
    pub async fn resolve(
        &self,
        request: &ResolutionRequest,
        token: &RunToken,
    ) -> Option<ResolutionOutcome> {
        match &request.selected_bank {
            Some(bank) => self.resolve_at(request, bank, token).await,
            None => self.scan_directory(request, token).await,
        }
    }

    async fn resolve_at(
        &self,
        request: &ResolutionRequest,
        bank: &BankEntry,
        token: &RunToken,
    ) -> Option<ResolutionOutcome> {
        if !token.is_current() {
            return None;
        }
        let account = request.account_number.as_str();
        debug!(run = token.id(), bank = %bank.display_name, "resolving at selected bank");

        let response = self.client.resolve(account, &bank.routing_code).await;
        if !token.is_current() {
            debug!(run = token.id(), "discarding stale lookup result");
            return None;
        }

        let outcome = match response {
            Ok(LookupResponse::Resolved(name)) => {
                info!(run = token.id(), bank = %bank.display_name, "account verified");
                ResolutionOutcome::Verified {
                    name,
                    matched_bank: bank.clone(),
                }
            }
            Ok(LookupResponse::NotFound) => ResolutionOutcome::NotFoundAtBank { bank: bank.clone() },
            Err(e) => {
                warn!(run = token.id(), bank = %bank.display_name, error = %e, "lookup failed");
                ResolutionOutcome::NetworkFailure
            }
        };
        Some(outcome)
    }

    async fn scan_directory(
        &self,
        request: &ResolutionRequest,
        token: &RunToken,
    ) -> Option<ResolutionOutcome> {
        let account = request.account_number.as_str();

        for bank in self.directory.entries() {
            if !token.is_current() {
                debug!(run = token.id(), "directory scan superseded");
                return None;
            }
            debug!(run = token.id(), bank = %bank.display_name, code = %bank.routing_code, "probing");

            let response = self.client.resolve(account, &bank.routing_code).await;
            if !token.is_current() {
                debug!(run = token.id(), "discarding stale lookup result");
                return None;
            }

            match response {
                Ok(LookupResponse::Resolved(name)) => {
                    info!(run = token.id(), bank = %bank.display_name, "account auto-linked");
                    return Some(ResolutionOutcome::Verified {
                        name,
                        matched_bank: bank.clone(),
                    });
                }
                Ok(LookupResponse::NotFound) => {}
                Err(e) => {
                    debug!(run = token.id(), bank = %bank.display_name, error = %e, "probe failed, skipping");
                }
            }
        }

        Some(ResolutionOutcome::NoMatchAcrossDirectory)
    }
}
