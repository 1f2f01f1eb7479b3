use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_loan, delete_book, get_book, get_loan, list_book_loans,
    list_books, list_loans, update_book, update_loan_returned,
};

/// Creates the API router with all catalog and loan endpoints
///
/// Book endpoints:
/// - POST /api/books - Register a new book
/// - GET /api/books - List books with filters
/// - GET /api/books/:id - Get book details
/// - PUT /api/books/:id - Update title and author
/// - DELETE /api/books/:id - Delete a book
/// - GET /api/books/:id/loans - Loan history of one book
///
/// Loan endpoints:
/// - POST /api/loans - Create a new loan
/// - GET /api/loans - List loans with filters
/// - GET /api/loans/:id - Get loan details
/// - PATCH /api/loans/:id - Update the returned flag
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Book endpoints
        .route("/api/books", post(create_book).get(list_books))
        .route(
            "/api/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/books/:id/loans", get(list_book_loans))
        // Loan endpoints
        .route("/api/loans", post(create_loan).get(list_loans))
        .route("/api/loans/:id", get(get_loan).patch(update_loan_returned))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
