use async_trait::async_trait;
use tracing::warn;

use crate::domain::{Book, Loan};
use crate::ports::notifier::{LoanNotifier, Result};

/// Log-only implementation of LoanNotifier
///
/// Stands in for a real delivery channel (e-mail, SMS). Emits one warn
/// record per late loan so operators can see what would have been sent.
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoanNotifier for TracingNotifier {
    async fn notify_late_loan(&self, loan: &Loan, book: &Book) -> Result<()> {
        warn!(
            customer = %loan.customer,
            email = loan.customer_email.as_deref().unwrap_or("-"),
            isbn = %book.isbn,
            title = %book.title,
            loan_date = %loan.loan_date,
            "late loan notice"
        );
        Ok(())
    }
}
