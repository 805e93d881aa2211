use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::middleware::auth_middleware;
use crate::services::repository::{BankRepository, InMemoryRepository, PgRepository};
use crate::services::{AccountService, AuthService, JwtService, TransactionService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt: JwtService,
    pub users: UserService,
    pub accounts: AccountService,
    pub transactions: TransactionService,
    pub auth: AuthService,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Wire the service against Postgres when a database url is
    /// configured, otherwise fall back to the in-memory store.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let repo: Arc<dyn BankRepository> = match &config.database.url {
            Some(url) => {
                let pg = PgRepository::connect(
                    url.expose_secret(),
                    config.database.max_connections,
                    config.database.min_connections,
                )
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to Postgres: {}", e);
                    e
                })?;
                pg.run_migrations().await.map_err(|e| {
                    tracing::error!("Failed to run database migrations: {}", e);
                    e
                })?;
                Arc::new(pg)
            }
            None => {
                tracing::warn!("No database url configured; using the in-memory store");
                Arc::new(InMemoryRepository::new())
            }
        };

        Self::build_with_repository(config, repo).await
    }

    pub async fn build_with_repository(
        config: Config,
        repo: Arc<dyn BankRepository>,
    ) -> Result<Self, AppError> {
        let jwt = JwtService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expiry_hours,
        );

        let accounts = AccountService::new(repo.clone());
        let state = AppState {
            config: config.clone(),
            jwt: jwt.clone(),
            users: UserService::new(repo.clone()),
            accounts: accounts.clone(),
            transactions: TransactionService::new(repo.clone(), accounts),
            auth: AuthService::new(repo, jwt),
        };

        let protected = Router::new()
            .route(
                "/v1/users/:user_id",
                get(handlers::users::get_user)
                    .patch(handlers::users::update_user)
                    .delete(handlers::users::delete_user),
            )
            .route(
                "/v1/accounts",
                post(handlers::accounts::create_account).get(handlers::accounts::list_accounts),
            )
            .route(
                "/v1/accounts/:account_number",
                get(handlers::accounts::get_account)
                    .patch(handlers::accounts::update_account)
                    .delete(handlers::accounts::delete_account),
            )
            .route(
                "/v1/accounts/:account_number/transactions",
                post(handlers::transactions::create_transaction)
                    .get(handlers::transactions::list_transactions),
            )
            .route(
                "/v1/accounts/:account_number/transactions/:transaction_id",
                get(handlers::transactions::get_transaction),
            )
            .route_layer(from_fn_with_state(state.clone(), auth_middleware));

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/v1/users", post(handlers::users::create_user))
            .route("/v1/auth/login", post(handlers::auth::login))
            .merge(protected)
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid listen address: {e}")))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
