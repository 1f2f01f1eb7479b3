use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info};

use crate::domain::LOAN_PERIOD_DAYS;
use crate::ports::LoanNotifier;

use super::catalog::BookCatalog;
use super::errors::Result;
use super::ledger::LoanLedger;

/// 延滞スイープ
///
/// 貸出日から貸出期間を超えて未返却の貸出を拾い、1件ずつ通知ポートへ
/// 流す。定期実行を想定したバッチ処理。
///
/// 処理フロー：
/// 1. 基準日（当日 - 貸出期間）までに貸し出された未返却の貸出を取得
/// 2. 各貸出について参照先の書籍を解決し、通知ポートを呼ぶ
/// 3. 個別の失敗は記録して続行する（1件の不備で全体を止めない）
///
/// # 戻り値
/// 通知できた件数
///
/// # エラー
/// 延滞一覧の取得に失敗した場合のみ。通知や書籍解決の失敗はログに
/// 落として飲み込む。
pub async fn sweep_late_loans(
    ledger: &LoanLedger,
    catalog: &BookCatalog,
    notifier: &Arc<dyn LoanNotifier>,
) -> Result<usize> {
    // 1. 延滞中の貸出を取得
    let cutoff = Utc::now().date_naive() - Duration::days(LOAN_PERIOD_DAYS);
    let late_loans = ledger.find_overdue(cutoff).await?;
    info!(count = late_loans.len(), %cutoff, "late loan sweep started");

    // 2. 1件ずつ書籍を解決して通知
    let mut notified = 0;
    for loan in late_loans {
        let book = match catalog.get_by_id(loan.book_id).await {
            Ok(Some(book)) => book,
            Ok(None) => {
                error!(
                    book_id = %loan.book_id.value(),
                    "late loan references a missing book, skipping"
                );
                continue;
            }
            Err(e) => {
                error!(error = %e, "failed to resolve book for late loan, skipping");
                continue;
            }
        };

        match notifier.notify_late_loan(&loan, &book).await {
            Ok(()) => notified += 1,
            Err(e) => {
                error!(
                    error = %e,
                    customer = %loan.customer,
                    isbn = %book.isbn,
                    "late loan notification failed"
                );
            }
        }
    }

    info!(notified, "late loan sweep finished");
    Ok(notified)
}
