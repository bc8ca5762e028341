use crate::domain::receipt::format_naira;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Lookup error: {0}")]
    LookupError(#[from] LookupError),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unknown bank: {0}")]
    UnknownBank(String),
    #[error("Recipient account has not been verified")]
    NotVerified,
    #[error("Incorrect PIN. Please try again.")]
    IncorrectPin,
    #[error("Insufficient Funds. Your balance is {}", format_naira(*balance))]
    InsufficientFunds { balance: Decimal },
}

/// Transport-level failure of a single account lookup.
///
/// "Account not found" is not an error; it is an ordinary lookup response.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("Lookup service unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
