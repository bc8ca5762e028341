use super::bank::BankEntry;
use crate::error::VaultError;
use serde::Serialize;
use std::fmt;

/// Length an account number must reach before it is resolved.
pub const ACCOUNT_NUMBER_LEN: usize = 10;

/// A 10-digit account number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn new(value: &str) -> Result<Self, VaultError> {
        if is_resolvable(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(VaultError::ValidationError(format!(
                "Account number must be exactly {ACCOUNT_NUMBER_LEN} digits, got {value:?}"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for AccountNumber {
    type Error = VaultError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Whether a raw input value triggers a resolution run.
pub fn is_resolvable(value: &str) -> bool {
    value.len() == ACCOUNT_NUMBER_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRequest {
    pub account_number: AccountNumber,
    pub selected_bank: Option<BankEntry>,
}

impl ResolutionRequest {
    pub fn new(account_number: AccountNumber, selected_bank: Option<BankEntry>) -> Self {
        Self {
            account_number,
            selected_bank,
        }
    }
}

/// Terminal result of one resolution run.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Verified { name: String, matched_bank: BankEntry },
    NotFoundAtBank { bank: BankEntry },
    NoMatchAcrossDirectory,
    NetworkFailure,
}

impl ResolutionOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    pub fn is_error(&self) -> bool {
        !self.is_verified()
    }

    pub fn resolved_name(&self) -> Option<&str> {
        match self {
            Self::Verified { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The sentence shown under the account field.
    pub fn message(&self) -> String {
        match self {
            Self::Verified { name, .. } => name.clone(),
            Self::NotFoundAtBank { bank } => format!("Account not found in {}", bank.display_name),
            Self::NoMatchAcrossDirectory => {
                "Could not auto-link. Please select bank manually.".to_string()
            }
            Self::NetworkFailure => "Lookup failed. Check internet.".to_string(),
        }
    }
}

/// What the presentation layer renders and gates "Next" on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionView {
    pub is_verifying: bool,
    pub resolved_name: Option<String>,
    pub is_error: bool,
    pub message: Option<String>,
    pub selected_bank: Option<BankEntry>,
}

impl ResolutionView {
    pub(crate) fn from_parts(
        is_verifying: bool,
        outcome: Option<&ResolutionOutcome>,
        selected_bank: Option<&BankEntry>,
    ) -> Self {
        Self {
            is_verifying,
            resolved_name: outcome.and_then(|o| o.resolved_name().map(str::to_string)),
            is_error: outcome.is_some_and(ResolutionOutcome::is_error),
            message: outcome.map(ResolutionOutcome::message),
            selected_bank: selected_bank.cloned(),
        }
    }

    pub fn can_proceed(&self) -> bool {
        !self.is_verifying && !self.is_error && self.resolved_name.is_some()
    }
}
