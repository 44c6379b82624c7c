use std::sync::Arc;

use loanhub_db::memory::MemoryLoanStore;
use loanhub_db::repositories::LoanRepo;
use loanhub_db::store::LoanStore;
use loanhub_loan::config::LoanConfig;
use loanhub_loan::LoanOrchestrator;
use loanhub_rpc::client::{HttpIdentityClient, HttpLedgerClient, RpcClient};
use loanhub_rpc::config::load_dotenv;
use loanhub_rpc::server::{bind, build_service_router, loan_routes, serve};
use loanhub_rpc::telemetry::init_tracing;
use loanhub_rpc::trust::SharedSecretAuthenticator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing("loanhub_loan=debug,loanhub_rpc=info,tower_http=info");

    // --- Configuration ---
    let config = LoanConfig::from_env()?;
    tracing::info!(
        host = %config.listen.host,
        port = config.listen.port,
        identity_url = %config.identity_url,
        ledger_url = %config.ledger_url,
        "Loaded loan configuration"
    );

    // --- Store ---
    let loans: Arc<dyn LoanStore> = match &config.database_url {
        Some(url) => {
            let pool = loanhub_db::create_pool(url).await?;
            loanhub_db::health_check(&pool).await?;
            loanhub_db::run_loan_migrations(&pool).await?;
            tracing::info!("Database ready");
            Arc::new(LoanRepo::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, loans are kept in memory");
            Arc::new(MemoryLoanStore::new())
        }
    };

    // --- Downstream ---
    let transport = &config.transport;
    let identity = HttpIdentityClient::new(RpcClient::new(
        config.identity_url.as_str(),
        &transport.trust_token,
        transport.rpc_timeout,
    )?);
    let ledger = HttpLedgerClient::new(RpcClient::new(
        config.ledger_url.as_str(),
        &transport.trust_token,
        transport.rpc_timeout,
    )?);

    let orchestrator = Arc::new(LoanOrchestrator::new(
        loans,
        Arc::new(identity),
        Arc::new(ledger),
    ));

    // --- Server ---
    let authenticator = Arc::new(SharedSecretAuthenticator::new(
        transport.trust_token.as_str(),
    ));
    let app = build_service_router("loan", loan_routes(orchestrator), authenticator);

    let listener = bind(&config.listen.host, config.listen.port).await?;
    serve(listener, app).await?;

    tracing::info!("Loan service stopped");
    Ok(())
}
