pub mod memory;
pub mod notify;
pub mod postgres;

pub use memory::{MemoryBookStore, MemoryLoanStore};
pub use notify::TracingNotifier;
pub use postgres::{PgBookStore, PgLoanStore};
