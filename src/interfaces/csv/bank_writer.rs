use crate::domain::bank::BankEntry;
use crate::error::Result;
use std::io::Write;

/// Writes bank entries as CSV with the same header [`super::bank_reader::BankReader`] accepts.
pub struct BankWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BankWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_banks<'a>(&mut self, banks: impl IntoIterator<Item = &'a BankEntry>) -> Result<()> {
        for bank in banks {
            self.writer.serialize(bank)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
