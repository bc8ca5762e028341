pub mod bank_reader;
pub mod bank_writer;
pub mod fixture_reader;
