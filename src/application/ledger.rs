use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::domain::{Book, Loan, LoanFilter, LoanId, LoanRequest, Page, PageRequest};
use crate::ports::{LoanStore, LoanWithBook};

use super::catalog::BookCatalog;
use super::errors::{Result, ServiceError};

/// 貸出台帳
///
/// 貸出の作成・返却・照会のユースケースを担う。書籍の解決は
/// カタログへ委譲し、貸出記録の永続化はストアポート越しに行う。
pub struct LoanLedger {
    catalog: Arc<BookCatalog>,
    store: Arc<dyn LoanStore>,
}

impl LoanLedger {
    pub fn new(catalog: Arc<BookCatalog>, store: Arc<dyn LoanStore>) -> Self {
        Self { catalog, store }
    }

    /// 貸出を作成する
    ///
    /// ビジネスルール：
    /// - isbn に該当する書籍が存在すること
    /// - 対象書籍に未返却の貸出が無いこと
    /// - 貸出日を省略した場合は当日を補う
    ///
    /// # 戻り値
    /// ID採番済みの貸出（作成時点では必ず未返却）
    ///
    /// # エラー
    /// - `BookNotFoundForIsbn`: isbn に該当する書籍が無い
    /// - `BookAlreadyLoaned`: 書籍に未返却の貸出がある
    pub async fn create(&self, request: LoanRequest) -> Result<Loan> {
        // 1. isbn から書籍を解決
        let book = self
            .catalog
            .get_by_isbn(&request.isbn)
            .await?
            .ok_or(ServiceError::BookNotFoundForIsbn)?;
        let book_id = book
            .id
            .ok_or(ServiceError::Internal("stored book is missing its id"))?;

        // 2. 未返却の貸出が無いことを確認
        if self.store.has_active_for_book(book_id).await? {
            return Err(ServiceError::BookAlreadyLoaned);
        }

        // 3. 登録。確認後に割り込まれた場合はストアの制約違反が
        //    同じ BookAlreadyLoaned に翻訳される
        let loan_date = request.loan_date.unwrap_or_else(|| Utc::now().date_naive());
        let loan = Loan::new(book_id, request.customer, request.customer_email, loan_date);
        let loan = self.store.insert(loan).await?;
        debug!(isbn = %book.isbn, customer = %loan.customer, "loan created");
        Ok(loan)
    }

    /// IDで貸出を引く。見つからなければ None。
    pub async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// 返却フラグを書き換える
    ///
    /// 貸出記録で変更できるのはこのフラグのみ。true の再送は冪等で、
    /// 返却済みの貸出に再度 true を書いてもエラーにしない。false への
    /// 書き戻し（返却の取り消し）も受け付けるが、その書籍に別の未返却
    /// 貸出がある場合はストアの制約が弾き、`BookAlreadyLoaned` になる。
    ///
    /// # エラー
    /// - `LoanNotFound`: 対象が存在しない
    pub async fn mark_returned(&self, id: LoanId, returned: bool) -> Result<Loan> {
        let loan = self
            .store
            .update_returned(id, returned)
            .await?
            .ok_or(ServiceError::LoanNotFound)?;
        debug!(loan_id = %id.value(), returned, "loan returned flag updated");
        Ok(loan)
    }

    /// 条件に合致する貸出を、書籍を結合したページで返す
    ///
    /// 結合はストアの責務。ここで1件ずつ書籍を引き直すことはしない。
    pub async fn find(
        &self,
        filter: &LoanFilter,
        page: PageRequest,
    ) -> Result<Page<LoanWithBook>> {
        Ok(self.store.find_by_filter(filter, page).await?)
    }

    /// 1冊の書籍の貸出履歴をページで返す（返却済みも含む）
    ///
    /// # エラー
    /// - `InvalidArgument`: 書籍の ID が未設定
    pub async fn list_for_book(&self, book: &Book, page: PageRequest) -> Result<Page<Loan>> {
        let id = book
            .id
            .ok_or(ServiceError::InvalidArgument("Book id must be set"))?;
        Ok(self.store.find_by_book(id, page).await?)
    }

    /// 延滞中の貸出を全件返す
    ///
    /// loan_date <= cutoff かつ未返却。バッチ用の全件取得。
    pub async fn find_overdue(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        Ok(self.store.find_overdue(cutoff).await?)
    }
}
