use async_trait::async_trait;

use crate::domain::{Book, Loan};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 延滞通知ポート
///
/// 借り手への連絡手段の境界。本番ではメール送信などの実装を差し込む。
/// 通知の失敗は呼び出し側（延滞スイープ）が記録して先へ進む。
#[async_trait]
pub trait LoanNotifier: Send + Sync {
    /// 延滞中の貸出について借り手へ通知する
    ///
    /// book は表示用。貸出が参照している書籍を渡すこと。
    async fn notify_late_loan(&self, loan: &Loan, book: &Book) -> Result<()>;
}
