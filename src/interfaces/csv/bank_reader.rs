use crate::domain::bank::{BankDirectory, BankEntry};
use crate::error::{Result, VaultError};
use std::io::Read;

/// Reads a bank directory from a CSV source with an `id,name,code,logo,color` header.
///
/// Row order becomes the directory's probe order.
pub struct BankReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> BankReader<R> {
    /// Creates a new `BankReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily deserializes bank entries.
    pub fn banks(self) -> impl Iterator<Item = Result<BankEntry>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(VaultError::from))
    }

    /// Reads every row into a directory, rejecting duplicate ids.
    pub fn into_directory(self) -> Result<BankDirectory> {
        let mut entries: Vec<BankEntry> = Vec::new();
        for bank in self.banks() {
            let bank = bank?;
            if entries.iter().any(|existing| existing.id == bank.id) {
                return Err(VaultError::ValidationError(format!(
                    "duplicate bank id {:?}",
                    bank.id
                )));
            }
            entries.push(bank);
        }
        Ok(BankDirectory::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "id, name, code, logo, color\n1, Access Bank, 044, A, #004a88\n2, GTBank, 058, GT, #dd4b39";
        let directory = BankReader::new(data.as_bytes()).into_directory().unwrap();

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.entries()[1].display_name, "GTBank");
        assert_eq!(directory.entries()[1].routing_code, "058");
    }

    #[test]
    fn test_reader_keeps_leading_zeros() {
        let data = "id,name,code,logo,color\n23,FairMoney MFB,090551,FM,#2b58f6";
        let directory = BankReader::new(data.as_bytes()).into_directory().unwrap();
        assert_eq!(directory.entries()[0].routing_code, "090551");
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "id,name,code,logo,color\n1,Access Bank";
        let results: Vec<Result<BankEntry>> = BankReader::new(data.as_bytes()).banks().collect();
        assert!(results[0].is_err());
    }

    #[test]
    fn test_reader_rejects_duplicate_ids() {
        let data = "id,name,code,logo,color\n1,Access Bank,044,A,#000\n1,GTBank,058,GT,#111";
        assert!(matches!(
            BankReader::new(data.as_bytes()).into_directory(),
            Err(VaultError::ValidationError(_))
        ));
    }
}
