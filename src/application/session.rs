use super::resolver::{Generation, ResolutionPolicy, RunToken};
use crate::config::DEFAULT_RUN_TIMEOUT;
use crate::domain::bank::{BankDirectory, BankEntry};
use crate::domain::ports::LookupClientRef;
use crate::domain::resolution::{
    ACCOUNT_NUMBER_LEN, AccountNumber, ResolutionOutcome, ResolutionRequest, ResolutionView,
    is_resolvable,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct SessionState {
    account_number: String,
    selected_bank: Option<BankEntry>,
    outcome: Option<ResolutionOutcome>,
    is_verifying: bool,
}

/// The recipient-account form state of one transfer screen.
///
/// Every edit supersedes any in-flight resolution run: only the run started by
/// the latest edit may write an outcome. Observers get a fresh
/// [`ResolutionView`] after every change through [`ResolutionSession::subscribe`].
pub struct ResolutionSession {
    directory: Arc<BankDirectory>,
    client: LookupClientRef,
    generation: Generation,
    run_timeout: Duration,
    state: Mutex<SessionState>,
    view_tx: watch::Sender<ResolutionView>,
}

impl ResolutionSession {
    pub fn new(directory: Arc<BankDirectory>, client: LookupClientRef) -> Self {
        let (view_tx, _) = watch::channel(ResolutionView::default());
        Self {
            directory,
            client,
            generation: Generation::new(),
            run_timeout: DEFAULT_RUN_TIMEOUT,
            state: Mutex::new(SessionState::default()),
            view_tx,
        }
    }

    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    pub fn view(&self) -> ResolutionView {
        self.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionView> {
        self.view_tx.subscribe()
    }

    pub fn account_number(&self) -> String {
        self.lock().account_number.clone()
    }

    pub fn selected_bank(&self) -> Option<BankEntry> {
        self.lock().selected_bank.clone()
    }

    /// The current outcome and the account it belongs to, if verified.
    pub fn verified(&self) -> Option<(AccountNumber, ResolutionOutcome)> {
        let state = self.lock();
        match &state.outcome {
            Some(outcome) if outcome.is_verified() && !state.is_verifying => {
                let account = AccountNumber::new(&state.account_number).ok()?;
                Some((account, outcome.clone()))
            }
            _ => None,
        }
    }

    /// Handles an edit of the account-number field.
    ///
    /// Clears the outcome on every edit and the selected bank on any value
    /// shorter than 10 characters. Resolves when the value is exactly 10 digits.
    pub async fn on_account_number_changed(&self, value: &str) {
        let token = {
            let mut state = self.lock();
            state.account_number = value.to_string();
            state.outcome = None;
            state.is_verifying = false;
            if value.chars().count() < ACCOUNT_NUMBER_LEN {
                state.selected_bank = None;
            }
            self.begin_run(state)
        };
        self.run(token).await;
    }

    /// Handles a pick from the bank list; re-resolves against that bank.
    pub async fn on_bank_manually_selected(&self, bank: BankEntry) {
        let token = {
            let mut state = self.lock();
            debug!(bank = %bank.display_name, "bank selected");
            state.selected_bank = Some(bank);
            state.outcome = None;
            state.is_verifying = false;
            self.begin_run(state)
        };
        self.run(token).await;
    }

    /// Re-runs resolution with the current inputs.
    pub async fn retry(&self) {
        let token = {
            let mut state = self.lock();
            state.outcome = None;
            state.is_verifying = false;
            self.begin_run(state)
        };
        self.run(token).await;
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // State is only ever replaced field by field, so a poisoned guard is still coherent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Supersedes any in-flight run and, when the inputs are resolvable, marks
    /// the session as verifying and hands back the new run's request.
    fn begin_run(
        &self,
        mut state: MutexGuard<'_, SessionState>,
    ) -> Option<(RunToken, ResolutionRequest)> {
        let token = self.generation.begin();
        let request = if is_resolvable(&state.account_number) {
            AccountNumber::new(&state.account_number)
                .ok()
                .map(|account| ResolutionRequest::new(account, state.selected_bank.clone()))
        } else {
            None
        };
        state.is_verifying = request.is_some();
        self.publish(&state);
        request.map(|request| (token, request))
    }

    async fn run(&self, started: Option<(RunToken, ResolutionRequest)>) {
        let Some((token, request)) = started else {
            return;
        };

        let policy = ResolutionPolicy::new(&self.directory, self.client.as_ref());
        let outcome = match tokio::time::timeout(self.run_timeout, policy.resolve(&request, &token)).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return,
            Err(_) => {
                warn!(run = token.id(), timeout = ?self.run_timeout, "resolution run timed out");
                ResolutionOutcome::NetworkFailure
            }
        };

        let mut state = self.lock();
        // Re-check under the lock: an edit may have landed after the policy returned.
        if !token.is_current() {
            debug!(run = token.id(), "discarding outcome of superseded run");
            return;
        }
        if let ResolutionOutcome::Verified { matched_bank, .. } = &outcome
            && state.selected_bank.is_none()
        {
            state.selected_bank = Some(matched_bank.clone());
        }
        state.outcome = Some(outcome);
        state.is_verifying = false;
        self.publish(&state);
    }

    fn publish(&self, state: &SessionState) {
        self.view_tx.send_replace(ResolutionView::from_parts(
            state.is_verifying,
            state.outcome.as_ref(),
            state.selected_bank.as_ref(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::ScriptedLookupClient;
    use tokio::sync::Notify;

    fn bank_x() -> BankEntry {
        BankEntry::new("x", "BankX", "044", "X", "#000000")
    }

    fn bank_y() -> BankEntry {
        BankEntry::new("y", "BankY", "058", "Y", "#ffffff")
    }

    fn session(client: &ScriptedLookupClient) -> ResolutionSession {
        ResolutionSession::new(
            Arc::new(BankDirectory::from_entries(vec![bank_x(), bank_y()])),
            Arc::new(client.clone()),
        )
    }

    #[tokio::test]
    async fn test_short_or_invalid_input_issues_no_lookup() {
        let client = ScriptedLookupClient::new();
        let session = session(&client);

        for value in ["", "0", "012345678", "01234567890", "01234x6789"] {
            session.on_account_number_changed(value).await;
            let view = session.view();
            assert!(!view.is_verifying);
            assert_eq!(view.message, None);
        }
        assert_eq!(client.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_auto_link_sets_selected_bank() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .build();
        let session = session(&client);

        session.on_account_number_changed("0123456789").await;

        let view = session.view();
        assert_eq!(view.resolved_name.as_deref(), Some("JOHN DOE"));
        assert!(view.can_proceed());
        assert_eq!(session.selected_bank(), Some(bank_y()));
        assert_eq!(client.routing_codes_called().await, vec!["044", "058"]);
    }

    #[tokio::test]
    async fn test_auto_linked_bank_is_sticky_for_retry() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .build();
        let session = session(&client);

        session.on_account_number_changed("0123456789").await;
        session.retry().await;

        assert_eq!(client.routing_codes_called().await, vec!["044", "058", "058"]);
        assert!(session.view().can_proceed());
    }

    #[tokio::test]
    async fn test_manual_bank_not_found() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .build();
        let session = session(&client);

        session.on_bank_manually_selected(bank_x()).await;
        assert_eq!(client.call_count().await, 0);

        session.on_account_number_changed("0123456789").await;

        let view = session.view();
        assert!(view.is_error);
        assert!(!view.can_proceed());
        assert_eq!(view.message.as_deref(), Some("Account not found in BankX"));
        assert_eq!(client.routing_codes_called().await, vec!["044"]);
    }

    #[tokio::test]
    async fn test_selecting_bank_re_resolves() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .build();
        let session = session(&client);
        session.on_bank_manually_selected(bank_x()).await;
        session.on_account_number_changed("0123456789").await;

        session.on_bank_manually_selected(bank_y()).await;

        assert_eq!(session.view().resolved_name.as_deref(), Some("JOHN DOE"));
        assert_eq!(client.routing_codes_called().await, vec!["044", "058"]);
    }

    #[tokio::test]
    async fn test_short_edit_clears_outcome_and_bank() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .build();
        let session = session(&client);
        session.on_account_number_changed("0123456789").await;
        assert!(session.verified().is_some());

        session.on_account_number_changed("012345678").await;

        assert_eq!(session.view(), ResolutionView::default());
        assert_eq!(session.selected_bank(), None);
        assert!(session.verified().is_none());
    }

    #[tokio::test]
    async fn test_short_edit_counts_characters_not_bytes() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .build();
        let session = session(&client);
        session.on_account_number_changed("0123456789").await;
        assert_eq!(session.selected_bank(), Some(bank_y()));

        // Nine characters, ten bytes.
        session.on_account_number_changed("01234567é").await;

        assert_eq!(session.selected_bank(), None);
        assert_eq!(session.view(), ResolutionView::default());
        assert_eq!(client.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_long_edit_clears_outcome_but_keeps_bank() {
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .build();
        let session = session(&client);
        session.on_account_number_changed("0123456789").await;
        assert!(session.view().can_proceed());

        session.on_account_number_changed("01234567890").await;

        let view = session.view();
        assert_eq!(view.message, None);
        assert_eq!(view.resolved_name, None);
        assert!(!view.can_proceed());
        assert!(session.verified().is_none());
        assert_eq!(session.selected_bank(), Some(bank_y()));
        assert_eq!(client.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_network_failure_at_selected_bank() {
        let client = ScriptedLookupClient::builder().with_unreachable("044").build();
        let session = session(&client);
        session.on_bank_manually_selected(bank_x()).await;
        session.on_account_number_changed("0123456789").await;

        let view = session.view();
        assert!(view.is_error);
        assert_eq!(view.message.as_deref(), Some("Lookup failed. Check internet."));
    }

    #[tokio::test]
    async fn test_observer_sees_verifying_then_outcome() {
        let gate = Arc::new(Notify::new());
        let client = ScriptedLookupClient::builder()
            .with_account("0123456789", "058", "JOHN DOE")
            .with_gate("0123456789", Arc::clone(&gate))
            .build();
        let session = session(&client);
        let mut views = session.subscribe();

        let run = session.on_account_number_changed("0123456789");
        let observe = async {
            views.changed().await.unwrap();
            assert!(views.borrow_and_update().is_verifying);
            gate.notify_one();
            gate.notify_one();
            views.changed().await.unwrap();
            views.borrow_and_update().clone()
        };
        let ((), final_view) = tokio::join!(run, observe);

        assert!(!final_view.is_verifying);
        assert_eq!(final_view.resolved_name.as_deref(), Some("JOHN DOE"));
    }

    #[tokio::test]
    async fn test_stale_scan_result_never_overwrites_newer_edit() {
        let gate_a = Arc::new(Notify::new());
        let client = ScriptedLookupClient::builder()
            .with_account("1111111111", "044", "STALE NAME")
            .with_account("2222222222", "044", "FRESH NAME")
            .with_gate("1111111111", Arc::clone(&gate_a))
            .build();
        let session = session(&client);

        let run_a = session.on_account_number_changed("1111111111");
        let edit_to_b = async {
            // Let run A issue its first probe and block on the gate.
            while client.call_count().await == 0 {
                tokio::task::yield_now().await;
            }
            session.on_account_number_changed("2222222222").await;
            assert_eq!(session.view().resolved_name.as_deref(), Some("FRESH NAME"));
            gate_a.notify_one();
        };
        tokio::join!(run_a, edit_to_b);

        let view = session.view();
        assert_eq!(view.resolved_name.as_deref(), Some("FRESH NAME"));
        assert_eq!(session.selected_bank(), Some(bank_x()));
        // Run A dropped its in-flight answer and never moved on to BankY.
        let a_calls = client
            .calls()
            .await
            .into_iter()
            .filter(|(account, _)| account == "1111111111")
            .count();
        assert_eq!(a_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_timeout_yields_network_failure() {
        let gate = Arc::new(Notify::new());
        let client = ScriptedLookupClient::builder().with_gate("0123456789", gate).build();
        let session = session(&client).with_run_timeout(Duration::from_secs(5));

        session.on_account_number_changed("0123456789").await;

        let view = session.view();
        assert!(!view.is_verifying);
        assert_eq!(view.message.as_deref(), Some("Lookup failed. Check internet."));
        assert!(!view.can_proceed());
    }
}
