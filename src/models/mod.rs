//! Data models for Storyshelf

pub mod book;
pub mod child;
pub mod copy;
pub mod import_report;
pub mod journal;
pub mod loan;
pub mod location;

// Re-export commonly used types
pub use book::{Book, BookLookup};
pub use child::Child;
pub use copy::{BookCopy, CatalogueEntry, CopyStatus};
pub use journal::{JournalEntry, JournalEntryWithBook, ReaderJournal};
pub use loan::{Loan, LoanDetails, LoanFilter};
pub use location::Location;
