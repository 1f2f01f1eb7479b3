use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Book, BookId, Loan, LoanFilter, LoanId, Page, PageRequest};

use super::StoreResult;

/// 結合済み貸出 - 一覧表示用に参照先の書籍を添えた貸出
///
/// 結合はストアの責務。サービス層で1件ずつ書籍を引き直さない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanWithBook {
    pub loan: Loan,
    pub book: Book,
}

/// 貸出ストアポート
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// 貸出を登録し、ID採番済みの貸出を返す
    ///
    /// 対象書籍に未返却の貸出が既にある場合は `StoreError::ActiveLoanExists`
    /// を返す。呼び出し側の事前確認とは独立に、ストア自身の制約として
    /// 保証すること。
    async fn insert(&self, loan: Loan) -> StoreResult<Loan>;

    /// IDで引く
    async fn find_by_id(&self, id: LoanId) -> StoreResult<Option<Loan>>;

    /// 書籍に未返却の貸出があるか
    async fn has_active_for_book(&self, book_id: BookId) -> StoreResult<bool>;

    /// returned フラグだけを書き換え、更新後の貸出を返す
    ///
    /// 貸出記録で変更してよいのはこのフラグのみ。対象が存在しなければ
    /// `None`。false への書き戻しが「未返却1件まで」の制約に触れる場合は
    /// `StoreError::ActiveLoanExists` を返す。
    async fn update_returned(&self, id: LoanId, returned: bool) -> StoreResult<Option<Loan>>;

    /// 条件に合致する貸出を、書籍を結合したページで返す
    ///
    /// 並び順は loan_date 降順、同日は id で安定化。
    async fn find_by_filter(
        &self,
        filter: &LoanFilter,
        page: PageRequest,
    ) -> StoreResult<Page<LoanWithBook>>;

    /// 1冊の書籍の貸出履歴をページで返す（返却済みも含む）
    ///
    /// 並び順は find_by_filter と同じ。
    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> StoreResult<Page<Loan>>;

    /// 延滞中の貸出を全件返す
    ///
    /// loan_date <= cutoff かつ未返却。バッチ用の全件取得で、
    /// ページングしない。並び順は loan_date 昇順。
    async fn find_overdue(&self, cutoff: NaiveDate) -> StoreResult<Vec<Loan>>;
}
