//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use account::{AccountConfig, PgAccountRepository, QqConfig, QqProvider, account_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::cache::RedisTtlStore;
use platform::mailer::{Mailer, MailerConfig};
use platform::sms::{SmsConfig, SmsSender};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verify::{VerifyConfig, verify_router};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,account=info,verify=info,dispatch=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Cache store (verification codes, send flags)
    let redis_url =
        env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let store = RedisTtlStore::connect(&redis_url).await?;

    tracing::info!("Connected to cache store");

    // Outbound senders and the dispatch worker
    let mailer = Mailer::new(&mailer_config_from_env())?;
    let sms = SmsSender::new(sms_config_from_env());

    let (dispatcher, task_rx) = dispatch::task_queue(256);
    let _worker = dispatch::spawn_worker(task_rx, sms, mailer);

    // Account configuration
    let account_config = if cfg!(debug_assertions) {
        AccountConfig::development()
    } else {
        // In production, the token secret comes from the environment
        let token_secret =
            env::var("TOKEN_SECRET").expect("TOKEN_SECRET must be set in production");
        AccountConfig {
            token_secret,
            verify_email_base_url: env::var("VERIFY_EMAIL_BASE_URL").unwrap_or_else(|_| {
                AccountConfig::default().verify_email_base_url
            }),
            ..AccountConfig::default()
        }
    };

    let provider = QqProvider::new(qq_config_from_env());
    let repo = PgAccountRepository::new(pool.clone());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8080,http://127.0.0.1:8080".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/verify",
            verify_router(store.clone(), dispatcher.clone(), VerifyConfig::default()),
        )
        .nest(
            "/api",
            account_router(repo, store, provider, dispatcher, account_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8393));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// SMTP settings from the environment (no-op mailer when unset)
fn mailer_config_from_env() -> MailerConfig {
    let defaults = MailerConfig::default();
    MailerConfig {
        smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
        smtp_port: env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.smtp_port),
        smtp_username: env::var("SMTP_USERNAME").ok(),
        smtp_password: env::var("SMTP_PASSWORD").ok(),
        from: env::var("SMTP_FROM").unwrap_or(defaults.from),
        use_starttls: defaults.use_starttls,
    }
}

/// SMS gateway settings from the environment (no-op sender when unset)
fn sms_config_from_env() -> SmsConfig {
    let defaults = SmsConfig::default();
    SmsConfig {
        endpoint: env::var("SMS_ENDPOINT").unwrap_or_default(),
        app_id: env::var("SMS_APP_ID").unwrap_or_default(),
        app_key: env::var("SMS_APP_KEY").unwrap_or_default(),
        template_id: env::var("SMS_TEMPLATE_ID")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.template_id),
    }
}

/// QQ Connect settings from the environment
fn qq_config_from_env() -> QqConfig {
    QqConfig {
        client_id: env::var("QQ_CLIENT_ID").unwrap_or_default(),
        client_secret: env::var("QQ_CLIENT_SECRET").unwrap_or_default(),
        redirect_uri: env::var("QQ_REDIRECT_URI").unwrap_or_default(),
        timeout: Duration::from_secs(5),
    }
}
