use super::receipt::Receipt;
use super::resolution::{AccountNumber, ResolutionOutcome};
use crate::error::VaultError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Opening balance of the demo wallet.
pub const DEMO_OPENING_BALANCE: Decimal = dec!(19260000.00);

/// A wallet balance in naira.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A strictly positive amount moved in or out of the wallet.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, VaultError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(VaultError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = VaultError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A 4-digit transaction PIN.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin([u8; 4]);

impl Pin {
    pub fn new(value: &str) -> Result<Self, VaultError> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| VaultError::ValidationError("PIN must be 4 digits".to_string()))?;
        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(VaultError::ValidationError(
                "PIN must be 4 digits".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    /// Compares without short-circuiting on the first differing digit.
    fn matches(&self, other: &Pin) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum TransferCategory {
    #[default]
    Personal,
    Business,
    Bills,
    Family,
}

impl fmt::Display for TransferCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Personal => "Personal",
            Self::Business => "Business",
            Self::Bills => "Bills",
            Self::Family => "Family",
        };
        f.write_str(label)
    }
}

/// A transfer to a verified recipient, waiting for PIN confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub recipient_name: String,
    pub bank_name: String,
    pub account_number: AccountNumber,
    pub amount: Amount,
    pub note: Option<String>,
    pub category: TransferCategory,
}

impl TransferDraft {
    /// Builds a draft only from a verified outcome.
    pub fn from_outcome(
        outcome: &ResolutionOutcome,
        account_number: AccountNumber,
        amount: Amount,
        note: Option<String>,
        category: TransferCategory,
    ) -> Result<Self, VaultError> {
        match outcome {
            ResolutionOutcome::Verified { name, matched_bank } => Ok(Self {
                recipient_name: name.clone(),
                bank_name: matched_bank.display_name.clone(),
                account_number,
                amount,
                note: note.filter(|n| !n.trim().is_empty()),
                category,
            }),
            _ => Err(VaultError::NotVerified),
        }
    }
}

/// The user's mock wallet: balance plus the PIN that authorizes debits.
#[derive(Debug, Clone)]
pub struct Wallet {
    balance: Balance,
    pin: Pin,
}

impl Wallet {
    pub fn new(opening_balance: Balance, pin: Pin) -> Self {
        Self {
            balance: opening_balance,
            pin,
        }
    }

    pub fn demo(pin: Pin) -> Self {
        Self::new(Balance::new(DEMO_OPENING_BALANCE), pin)
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Credits funds to the balance
    pub fn deposit(&mut self, amount: Amount) {
        self.balance += amount.into();
    }

    /// Checks the PIN and funds, then debits the balance and issues a receipt.
    ///
    /// On any error the balance is left untouched.
    pub fn confirm_transfer(
        &mut self,
        draft: TransferDraft,
        entered_pin: &str,
    ) -> Result<Receipt, VaultError> {
        let entered = Pin::new(entered_pin)?;
        if !self.pin.matches(&entered) {
            return Err(VaultError::IncorrectPin);
        }

        let debit: Balance = draft.amount.into();
        if debit > self.balance {
            return Err(VaultError::InsufficientFunds {
                balance: self.balance.0,
            });
        }

        self.balance -= debit;
        Ok(Receipt::issue(draft, self.balance))
    }
}
