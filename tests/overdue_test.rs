use chrono::{Duration, Utc};
use rusty_library_api::adapters::memory::{MemoryBookStore, MemoryLoanStore};
use rusty_library_api::application::{BookCatalog, LoanLedger, sweep_late_loans};
use rusty_library_api::domain::{Book, Loan, LoanRequest};
use rusty_library_api::ports::{LoanNotifier, notifier};
use std::sync::{Arc, Mutex};

// ============================================================================
// テスト用の通知実装
// ============================================================================

/// 通知内容を記録するだけの通知実装
///
/// failing_customer に一致する宛先では配送失敗を装う。
struct RecordingNotifier {
    notices: Mutex<Vec<(String, String)>>,
    failing_customer: Option<String>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            failing_customer: None,
        }
    }

    fn failing_for(customer: &str) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            failing_customer: Some(customer.to_string()),
        }
    }

    fn recorded(&self) -> Vec<(String, String)> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LoanNotifier for RecordingNotifier {
    async fn notify_late_loan(&self, loan: &Loan, book: &Book) -> notifier::Result<()> {
        if self.failing_customer.as_deref() == Some(loan.customer.as_str()) {
            return Err("smtp unreachable".into());
        }
        self.notices
            .lock()
            .unwrap()
            .push((loan.customer.clone(), book.isbn.clone()));
        Ok(())
    }
}

// ============================================================================
// テスト用ヘルパー
// ============================================================================

fn setup_ledger() -> (Arc<BookCatalog>, Arc<LoanLedger>) {
    let book_store = Arc::new(MemoryBookStore::new());
    let catalog = Arc::new(BookCatalog::new(book_store.clone()));
    let loan_store = Arc::new(MemoryLoanStore::new(book_store));
    let ledger = Arc::new(LoanLedger::new(catalog.clone(), loan_store));
    (catalog, ledger)
}

/// 指定の日数だけ過去の貸出を1冊分作る
async fn loan_days_ago(
    catalog: &BookCatalog,
    ledger: &LoanLedger,
    isbn: &str,
    customer: &str,
    days: i64,
) -> Loan {
    catalog
        .create(Book::new(isbn, "As aventuras", "Fulano"))
        .await
        .unwrap();
    ledger
        .create(LoanRequest {
            isbn: isbn.to_string(),
            customer: customer.to_string(),
            customer_email: None,
            loan_date: Some(Utc::now().date_naive() - Duration::days(days)),
        })
        .await
        .unwrap()
}

// ============================================================================
// スイープ
// ============================================================================

#[tokio::test]
async fn test_sweep_notifies_only_overdue_loans() {
    // Arrange: 延滞2件（基準日ちょうどを含む）、期限内1件、返却済み1件
    let (catalog, ledger) = setup_ledger();
    loan_days_ago(&catalog, &ledger, "001", "Fulano", 6).await;
    loan_days_ago(&catalog, &ledger, "002", "Beltrano", 4).await;
    loan_days_ago(&catalog, &ledger, "003", "Sicrano", 3).await;
    let returned = loan_days_ago(&catalog, &ledger, "004", "Maria", 10).await;
    ledger
        .mark_returned(returned.id.unwrap(), true)
        .await
        .unwrap();

    let recording = Arc::new(RecordingNotifier::new());
    let notifier: Arc<dyn LoanNotifier> = recording.clone();

    // Act
    let notified = sweep_late_loans(&ledger, &catalog, &notifier).await.unwrap();

    // Assert: 延滞分だけが、古い貸出から順に通知される
    assert_eq!(notified, 2);
    assert_eq!(
        recording.recorded(),
        vec![
            ("Fulano".to_string(), "001".to_string()),
            ("Beltrano".to_string(), "002".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_sweep_continues_after_notification_failure() {
    // Arrange: 2件の延滞のうち、古い方の宛先で配送が失敗する
    let (catalog, ledger) = setup_ledger();
    loan_days_ago(&catalog, &ledger, "001", "Fulano", 8).await;
    loan_days_ago(&catalog, &ledger, "002", "Beltrano", 5).await;

    let recording = Arc::new(RecordingNotifier::failing_for("Fulano"));
    let notifier: Arc<dyn LoanNotifier> = recording.clone();

    // Act
    let notified = sweep_late_loans(&ledger, &catalog, &notifier).await.unwrap();

    // Assert: 失敗は数えず、残りの通知は続行される
    assert_eq!(notified, 1);
    assert_eq!(
        recording.recorded(),
        vec![("Beltrano".to_string(), "002".to_string())]
    );
}

#[tokio::test]
async fn test_sweep_with_nothing_overdue() {
    let (catalog, ledger) = setup_ledger();
    loan_days_ago(&catalog, &ledger, "001", "Fulano", 1).await;

    let notifier: Arc<dyn LoanNotifier> = Arc::new(RecordingNotifier::new());

    let notified = sweep_late_loans(&ledger, &catalog, &notifier).await.unwrap();

    assert_eq!(notified, 0);
}
