use std::sync::Arc;

use loanhub_gateway::config::GatewayConfig;
use loanhub_gateway::router::build_app_router;
use loanhub_gateway::state::AppState;
use loanhub_rpc::client::{HttpIdentityClient, HttpLoanClient, RpcClient};
use loanhub_rpc::config::load_dotenv;
use loanhub_rpc::server::{bind, serve};
use loanhub_rpc::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing("loanhub_gateway=debug,loanhub_rpc=info,tower_http=info");

    // --- Configuration ---
    let config = GatewayConfig::from_env()?;
    tracing::info!(
        host = %config.listen.host,
        port = config.listen.port,
        identity_url = %config.identity_url,
        loan_url = %config.loan_url,
        secure_cookies = config.secure_cookies,
        "Loaded gateway configuration"
    );

    // --- Downstream ---
    let transport = &config.transport;
    let identity = HttpIdentityClient::new(RpcClient::new(
        config.identity_url.as_str(),
        &transport.trust_token,
        transport.rpc_timeout,
    )?);
    let loans = HttpLoanClient::new(RpcClient::new(
        config.loan_url.as_str(),
        &transport.trust_token,
        transport.rpc_timeout,
    )?);

    // --- Server ---
    let listener = bind(&config.listen.host, config.listen.port).await?;
    let state = AppState {
        identity: Arc::new(identity),
        loans: Arc::new(loans),
        config: Arc::new(config),
    };
    serve(listener, build_app_router(state)).await?;

    tracing::info!("Gateway stopped");
    Ok(())
}
