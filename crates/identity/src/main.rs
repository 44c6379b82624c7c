use std::sync::Arc;

use loanhub_db::memory::MemoryUserStore;
use loanhub_db::repositories::UserRepo;
use loanhub_db::store::UserStore;
use loanhub_identity::config::IdentityConfig;
use loanhub_identity::IdentityService;
use loanhub_rpc::client::{HttpLedgerClient, RpcClient};
use loanhub_rpc::config::load_dotenv;
use loanhub_rpc::server::{bind, build_service_router, identity_routes, serve};
use loanhub_rpc::telemetry::init_tracing;
use loanhub_rpc::trust::SharedSecretAuthenticator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing("loanhub_identity=debug,loanhub_rpc=info,tower_http=info");

    // --- Configuration ---
    let config = IdentityConfig::from_env()?;
    tracing::info!(
        host = %config.listen.host,
        port = config.listen.port,
        ledger_url = %config.ledger_url,
        "Loaded identity configuration"
    );

    // --- Store ---
    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let pool = loanhub_db::create_pool(url).await?;
            loanhub_db::health_check(&pool).await?;
            loanhub_db::run_identity_migrations(&pool).await?;
            tracing::info!("Database ready");
            Arc::new(UserRepo::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory");
            Arc::new(MemoryUserStore::new())
        }
    };

    // --- Downstream ---
    let ledger = HttpLedgerClient::new(RpcClient::new(
        config.ledger_url.as_str(),
        &config.transport.trust_token,
        config.transport.rpc_timeout,
    )?);

    let service = Arc::new(IdentityService::new(
        users,
        Arc::new(ledger),
        config.jwt.clone(),
        config.password,
    ));

    if let Some(admin) = &config.bootstrap_admin {
        // The ledger may not be up yet; a failed bootstrap is retried on the next start.
        if let Err(err) = service.ensure_admin(&admin.username, &admin.password).await {
            tracing::error!(error = %err, "Admin bootstrap failed");
        }
    }

    // --- Server ---
    let authenticator = Arc::new(SharedSecretAuthenticator::new(
        config.transport.trust_token.as_str(),
    ));
    let app = build_service_router("identity", identity_routes(service), authenticator);

    let listener = bind(&config.listen.host, config.listen.port).await?;
    serve(listener, app).await?;

    tracing::info!("Identity service stopped");
    Ok(())
}
