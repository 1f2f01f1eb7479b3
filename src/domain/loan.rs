use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId};

/// 貸出期間（日数）。これを超えた未返却の貸出が延滞となる。
pub const LOAN_PERIOD_DAYS: i64 = 4;

/// 貸出 - 1冊の書籍の1回の貸出記録
///
/// ビジネスルール：
/// - 書籍への参照は ID のみ（詳細はストア経由で引く）
/// - 同じ書籍に対する未返却の貸出は同時に1件まで
/// - 登録後に変更できるのは returned フラグだけ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子（ストア採番。未登録の間は None）
    pub id: Option<LoanId>,

    // 貸出対象への参照
    pub book_id: BookId,

    // 借り手
    pub customer: String,
    pub customer_email: Option<String>,

    // 貸出状態
    pub loan_date: NaiveDate,
    pub returned: bool,
}

impl Loan {
    /// 新しい貸出記録を作る。作成時点では必ず未返却。
    pub fn new(
        book_id: BookId,
        customer: impl Into<String>,
        customer_email: Option<String>,
        loan_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            book_id,
            customer: customer.into(),
            customer_email,
            loan_date,
            returned: false,
        }
    }

    /// 未返却か
    pub fn is_active(&self) -> bool {
        !self.returned
    }

    /// 基準日時点で延滞しているか
    ///
    /// 貸出日が基準日以前（当日を含む）かつ未返却のものが延滞。
    pub fn is_overdue_at(&self, cutoff: NaiveDate) -> bool {
        !self.returned && self.loan_date <= cutoff
    }
}

/// 貸出申込 - API から台帳に渡る作成要求
///
/// 書籍は isbn で指定する。貸出日を省略した場合は台帳が当日を補う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub isbn: String,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: Option<NaiveDate>,
}

/// 貸出の検索条件
///
/// 未設定のフィールドはワイルドカード。isbn は結合した書籍の業務キーと、
/// customer は借り手名との完全一致で、複数指定時は AND 結合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanFilter {
    pub isbn: Option<String>,
    pub customer: Option<String>,
}

impl LoanFilter {
    /// 条件がひとつも設定されていないか
    pub fn is_unfiltered(&self) -> bool {
        self.isbn.is_none() && self.customer.is_none()
    }

    /// 貸出（と結合済みの書籍 isbn）がこの条件に合致するか
    pub fn matches(&self, loan: &Loan, book_isbn: &str) -> bool {
        let isbn_ok = match &self.isbn {
            Some(isbn) => isbn == book_isbn,
            None => true,
        };
        let customer_ok = match &self.customer {
            Some(customer) => *customer == loan.customer,
            None => true,
        };
        isbn_ok && customer_ok
    }
}
