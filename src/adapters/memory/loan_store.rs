use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{BookId, Loan, LoanFilter, LoanId, Page, PageRequest};
use crate::ports::loan_store::{LoanStore, LoanWithBook};
use crate::ports::{StoreError, StoreResult};

use super::book_store::MemoryBookStore;

/// 貸出ストアのメモリ実装
///
/// 「同一書籍の未返却貸出は1件まで」をロックの中で確認してから書く
/// ことで、Postgres 版の部分一意インデックスに相当する保証を作る。
/// 一覧の書籍結合のために書籍ストアを抱える。
pub struct MemoryLoanStore {
    loans: Mutex<HashMap<LoanId, Loan>>,
    books: Arc<MemoryBookStore>,
}

impl MemoryLoanStore {
    pub fn new(books: Arc<MemoryBookStore>) -> Self {
        Self {
            loans: Mutex::new(HashMap::new()),
            books,
        }
    }

    /// loan_date 降順、同日は id で安定化
    fn sort_newest_first(loans: &mut [Loan]) {
        loans.sort_by(|a, b| {
            b.loan_date
                .cmp(&a.loan_date)
                .then_with(|| id_key(a).cmp(&id_key(b)))
        });
    }
}

fn id_key(loan: &Loan) -> Option<uuid::Uuid> {
    loan.id.map(|id| id.value())
}

#[async_trait]
impl LoanStore for MemoryLoanStore {
    async fn insert(&self, mut loan: Loan) -> StoreResult<Loan> {
        let mut loans = self.loans.lock().unwrap();

        // 部分一意インデックスに相当する確認。ロック中なので割り込みは
        // 起きない
        let active_exists = loans
            .values()
            .any(|l| l.book_id == loan.book_id && !l.returned);
        if active_exists {
            return Err(StoreError::ActiveLoanExists);
        }

        let id = LoanId::new();
        loan.id = Some(id);
        loans.insert(id, loan.clone());
        Ok(loan)
    }

    async fn find_by_id(&self, id: LoanId) -> StoreResult<Option<Loan>> {
        Ok(self.loans.lock().unwrap().get(&id).cloned())
    }

    async fn has_active_for_book(&self, book_id: BookId) -> StoreResult<bool> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .any(|l| l.book_id == book_id && !l.returned))
    }

    async fn update_returned(&self, id: LoanId, returned: bool) -> StoreResult<Option<Loan>> {
        let mut loans = self.loans.lock().unwrap();

        let Some(current) = loans.get(&id).cloned() else {
            return Ok(None);
        };

        // false への書き戻しは、同じ書籍の別の未返却貸出と衝突しないか
        // 確認してから書く
        if !returned {
            let other_active = loans
                .values()
                .any(|l| l.id != Some(id) && l.book_id == current.book_id && !l.returned);
            if other_active {
                return Err(StoreError::ActiveLoanExists);
            }
        }

        let loan = loans.get_mut(&id).map(|loan| {
            loan.returned = returned;
            loan.clone()
        });
        Ok(loan)
    }

    async fn find_by_filter(
        &self,
        filter: &LoanFilter,
        page: PageRequest,
    ) -> StoreResult<Page<LoanWithBook>> {
        // ロックを持ったまま書籍ストアへ入らないよう、先に写しを取る
        let mut loans: Vec<Loan> = self.loans.lock().unwrap().values().cloned().collect();
        Self::sort_newest_first(&mut loans);

        let mut matched = Vec::new();
        for loan in loans {
            let Some(book) = self.books.get_snapshot(loan.book_id) else {
                // 書籍が消えた孤児レコードは一覧に出さない
                continue;
            };
            if filter.matches(&loan, &book.isbn) {
                matched.push(LoanWithBook { loan, book });
            }
        }

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> StoreResult<Page<Loan>> {
        let mut matched: Vec<Loan> = self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.book_id == book_id)
            .cloned()
            .collect();
        Self::sort_newest_first(&mut matched);

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn find_overdue(&self, cutoff: NaiveDate) -> StoreResult<Vec<Loan>> {
        let mut overdue: Vec<Loan> = self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.is_overdue_at(cutoff))
            .cloned()
            .collect();

        // 古いものから通知したいので昇順
        overdue.sort_by(|a, b| {
            a.loan_date
                .cmp(&b.loan_date)
                .then_with(|| id_key(a).cmp(&id_key(b)))
        });
        Ok(overdue)
    }
}
