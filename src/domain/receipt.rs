use super::wallet::{Amount, Balance, TransferCategory, TransferDraft};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferStatus {
    Success,
}

/// Proof of a completed transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub reference: String,
    pub session_id: String,
    pub amount: Amount,
    pub recipient_name: String,
    pub bank_name: String,
    pub account_number: String,
    pub note: Option<String>,
    pub category: TransferCategory,
    pub balance_after: Balance,
    pub timestamp: DateTime<Utc>,
    pub status: TransferStatus,
}

impl Receipt {
    pub(crate) fn issue(draft: TransferDraft, balance_after: Balance) -> Self {
        Self {
            reference: new_reference(),
            session_id: new_session_id(),
            amount: draft.amount,
            recipient_name: draft.recipient_name,
            bank_name: draft.bank_name,
            account_number: draft.account_number.to_string(),
            note: draft.note,
            category: draft.category,
            balance_after,
            timestamp: Utc::now(),
            status: TransferStatus::Success,
        }
    }

    /// Plain-text summary handed to the platform share sheet.
    pub fn share_text(&self) -> String {
        format!(
            "G-VAULT Transaction\nAmount: {}\nRef: {}\nStatus: SUCCESS",
            format_naira(self.amount.value()),
            self.reference
        )
    }
}

/// "22" followed by 12 random digits.
fn new_reference() -> String {
    let n: u64 = rand::thread_rng().gen_range(0..1_000_000_000_000);
    format!("22{n:012}")
}

/// "10000" followed by 15 random digits.
fn new_session_id() -> String {
    let n: u64 = rand::thread_rng().gen_range(0..1_000_000_000_000_000);
    format!("10000{n:015}")
}

/// Formats an amount as naira with thousands separators and 2 decimals.
pub fn format_naira(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}₦{grouped}.{fraction}")
}
