pub mod book_store;
pub mod loan_store;

pub use book_store::MemoryBookStore;
pub use loan_store::MemoryLoanStore;
