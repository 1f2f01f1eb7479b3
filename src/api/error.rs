use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::ServiceError;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// リクエスト検証の失敗とアプリケーション層のエラーをまとめ、
/// HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    /// リクエストDTOの検証エラー（メッセージは1件ずつ並べて返す）
    Validation(Vec<String>),
    /// アプリケーション層のエラー
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // 400 Bad Request - リクエストボディの検証エラー
            ApiError::Validation(messages) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::from_messages(messages),
            ),

            ApiError::Service(err) => {
                let status = match &err {
                    // 400 Bad Request - ビジネスルール違反と前提違反
                    ServiceError::InvalidArgument(_)
                    | ServiceError::IsbnAlreadyRegistered
                    | ServiceError::BookNotFoundForIsbn
                    | ServiceError::BookAlreadyLoaned => StatusCode::BAD_REQUEST,

                    // 404 Not Found - リクエストされたリソースが存在しない
                    ServiceError::BookNotFound | ServiceError::LoanNotFound => {
                        StatusCode::NOT_FOUND
                    }

                    // 500 Internal Server Error - システム障害
                    // 詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                    ServiceError::Internal(_) | ServiceError::Store(_) => {
                        tracing::error!("unexpected service failure: {err:?}");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(ErrorResponse::new("An unexpected error occurred")),
                        )
                            .into_response();
                    }
                };
                (status, ErrorResponse::new(err.to_string()))
            }
        };

        (status, Json(body)).into_response()
    }
}
