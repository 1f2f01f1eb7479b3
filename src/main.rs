use rusty_library_api::{
    adapters::notify::TracingNotifier,
    adapters::postgres::{PgBookStore, PgLoanStore},
    api::{handlers::AppState, router::create_router},
    application::{BookCatalog, LoanLedger, sweep_late_loans},
    ports::LoanNotifier,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_api=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection URL
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/library".into());

    tracing::info!("Database URL: {}", database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters
    let book_store = Arc::new(PgBookStore::new(pool.clone()));
    let loan_store = Arc::new(PgLoanStore::new(pool.clone()));

    // Wire application services
    let catalog = Arc::new(BookCatalog::new(book_store));
    let ledger = Arc::new(LoanLedger::new(catalog.clone(), loan_store));

    // Spawn the daily late loan sweep
    let notifier: Arc<dyn LoanNotifier> = Arc::new(TracingNotifier::new());
    let sweep_catalog = catalog.clone();
    let sweep_ledger = ledger.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60 * 60 * 24));
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_late_loans(&sweep_ledger, &sweep_catalog, &notifier).await {
                tracing::error!("late loan sweep failed: {}", e);
            }
        }
    });

    // Create application state
    let app_state = Arc::new(AppState { catalog, ledger });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
