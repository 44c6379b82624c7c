use std::sync::Arc;

use loanhub_db::memory::MemoryWalletStore;
use loanhub_db::repositories::WalletRepo;
use loanhub_db::store::WalletStore;
use loanhub_ledger::config::LedgerConfig;
use loanhub_ledger::LedgerService;
use loanhub_rpc::config::load_dotenv;
use loanhub_rpc::server::{bind, build_service_router, ledger_routes, serve};
use loanhub_rpc::telemetry::init_tracing;
use loanhub_rpc::trust::SharedSecretAuthenticator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing("loanhub_ledger=debug,loanhub_rpc=info,tower_http=info");

    let config = LedgerConfig::from_env()?;
    tracing::info!(host = %config.listen.host, port = config.listen.port, "Loaded ledger configuration");

    let wallets: Arc<dyn WalletStore> = match &config.database_url {
        Some(url) => {
            let pool = loanhub_db::create_pool(url).await?;
            loanhub_db::health_check(&pool).await?;
            loanhub_db::run_ledger_migrations(&pool).await?;
            tracing::info!("Database ready");
            Arc::new(WalletRepo::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, wallets are kept in memory");
            Arc::new(MemoryWalletStore::new())
        }
    };

    let service = Arc::new(LedgerService::new(wallets));
    let authenticator = Arc::new(SharedSecretAuthenticator::new(
        config.transport.trust_token.as_str(),
    ));
    let app = build_service_router("ledger", ledger_routes(service), authenticator);

    let listener = bind(&config.listen.host, config.listen.port).await?;
    serve(listener, app).await?;

    tracing::info!("Ledger service stopped");
    Ok(())
}
