use crate::error::{Result, VaultError};
use crate::infrastructure::in_memory::ScriptedLookupClient;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct FixtureRow {
    account_number: String,
    bank_code: String,
    #[serde(default)]
    account_name: Option<String>,
}

/// Loads canned lookup answers for offline runs.
///
/// Header: `account_number,bank_code,account_name`. A row with an empty
/// `account_name` makes that bank code fail with a transport error.
pub fn read_fixtures<R: Read>(source: R) -> Result<ScriptedLookupClient> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut script = ScriptedLookupClient::builder();
    for row in reader.deserialize::<FixtureRow>() {
        let row = row.map_err(VaultError::from)?;
        script = match row.account_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => script.with_account(&row.account_number, &row.bank_code, name),
            None => script.with_unreachable(&row.bank_code),
        };
    }
    tracing::debug!(entries = script.len(), "lookup fixtures loaded");
    Ok(script.build())
}
