use super::session::ResolutionSession;
use crate::domain::receipt::Receipt;
use crate::domain::wallet::{Amount, Balance, TransferCategory, TransferDraft, Wallet};
use crate::error::{Result, VaultError};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// What the user typed on the amount screen.
#[derive(Debug, Clone)]
pub struct TransferInstruction {
    pub amount: Amount,
    pub note: Option<String>,
    pub category: TransferCategory,
}

/// Moves money out of the wallet to recipients verified by a
/// [`ResolutionSession`].
///
/// The wallet sits behind a lock so that a PIN check and the debit it
/// authorizes happen as one step.
pub struct TransferEngine {
    wallet: Mutex<Wallet>,
}

impl TransferEngine {
    pub fn new(wallet: Wallet) -> Self {
        Self {
            wallet: Mutex::new(wallet),
        }
    }

    pub async fn balance(&self) -> Balance {
        self.wallet.lock().await.balance()
    }

    pub async fn deposit(&self, amount: Amount) -> Balance {
        let mut wallet = self.wallet.lock().await;
        wallet.deposit(amount);
        info!(amount = %amount, "deposit credited");
        wallet.balance()
    }

    /// Confirms a transfer to the recipient currently verified in `session`.
    ///
    /// Fails with [`VaultError::NotVerified`] unless the session holds a
    /// verified outcome that is not being re-checked.
    pub async fn transfer(
        &self,
        session: &ResolutionSession,
        instruction: TransferInstruction,
        entered_pin: &str,
    ) -> Result<Receipt> {
        let (account_number, outcome) = session.verified().ok_or(VaultError::NotVerified)?;
        let draft = TransferDraft::from_outcome(
            &outcome,
            account_number,
            instruction.amount,
            instruction.note,
            instruction.category,
        )?;

        let mut wallet = self.wallet.lock().await;
        match wallet.confirm_transfer(draft, entered_pin) {
            Ok(receipt) => {
                info!(reference = %receipt.reference, amount = %receipt.amount, "transfer completed");
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "transfer rejected");
                Err(e)
            }
        }
    }

    /// Consumes the engine and returns the final wallet.
    pub fn into_wallet(self) -> Wallet {
        self.wallet.into_inner()
    }
}
