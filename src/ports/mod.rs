pub mod book_store;
pub mod errors;
pub mod loan_store;
pub mod notifier;

pub use book_store::BookStore;
pub use errors::{StoreError, StoreResult};
pub use loan_store::{LoanStore, LoanWithBook};
pub use notifier::LoanNotifier;
