mod catalog;
mod errors;
mod ledger;
mod overdue;

pub use catalog::BookCatalog;
pub use errors::{Result, ServiceError};
pub use ledger::LoanLedger;
pub use overdue::sweep_late_loans;
