//! Logging setup and the CSV trade journal.

mod journal;
mod logging;

pub use journal::{CsvTradeJournal, JournalKind, JOURNAL_HEADER};
pub use logging::setup_logging;
