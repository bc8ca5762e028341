#![allow(dead_code)]

use std::io::{Error, Write};
use tempfile::NamedTempFile;

/// Writes a lookup fixture file from `(account_number, bank_code, account_name)` rows.
pub fn fixtures(rows: &[(&str, &str, &str)]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "account_number,bank_code,account_name")?;
    for (account, code, name) in rows {
        writeln!(file, "{account},{code},{name}")?;
    }
    file.flush()?;
    Ok(file)
}

/// Writes a bank directory file from `(id, name, code)` rows.
pub fn directory(rows: &[(&str, &str, &str)]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "id,name,code,logo,color")?;
    for (id, name, code) in rows {
        writeln!(file, "{id},{name},{code},B,#000000")?;
    }
    file.flush()?;
    Ok(file)
}
