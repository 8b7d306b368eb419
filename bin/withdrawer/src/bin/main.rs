use alloy_primitives::U256;
use alloy_provider::Provider;
use clap::Parser;
use client::{DigestSigner, KeySigner, WalletSigner};
use config::NetworkConfig;
use oracle::GasPriceOracle;
use pipeline::{translate, unstake_and_claim, NodeReader, PipelineError, WithdrawalRequest};
use relay::FlashbotsClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};
use vault::reader::OnchainVault;
use withdrawer::{
    config::Config,
    metrics::{install_prometheus_exporter, Metrics},
    report_progress,
};

/// Withdraw staked tokens from a vault through a private relay bundle.
#[derive(Parser, Debug)]
#[command(name = "withdrawer", version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Amount of staking tokens to withdraw, in base units
    #[arg(long)]
    amount: U256,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting withdrawer");
    info!("Loading config: {:?}", cli.config);

    let config = Config::from_file(&cli.config)?;

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!("Prometheus exporter listening on port {port}");
    }
    let metrics = Metrics::new();

    let mut network = NetworkConfig::from_chain_id(config.chain_id)?;
    if let Some(endpoint) = &config.gas_price_endpoint {
        network = network.with_gas_price_endpoint(endpoint);
    }

    info!("  RPC URL: {}", config.rpc_url);
    info!("  Chain: {}", config.chain_id);
    info!("  Program: {}", config.program_address);
    info!("  Vault: {}", config.vault_address);
    info!("  Recipient: {}", config.recipient_address);
    info!("  Amount: {}", cli.amount);

    let provider = client::create_provider(&config.rpc_url).await?;

    let request = WithdrawalRequest {
        program: config.program_address,
        vault: config.vault_address,
        recipient: config.recipient_address,
        amount: cli.amount,
        chain_id: config.chain_id,
    };

    let outcome = if let Some(endpoint) = &config.wallet_endpoint {
        let owner = config
            .owner_address
            .ok_or_else(|| eyre::eyre!("owner_address is required with wallet_endpoint"))?;
        let signer = WalletSigner::new(endpoint.clone(), owner);
        run(request, &signer, provider, &network, &metrics).await
    } else {
        let key = config
            .private_key
            .as_deref()
            .ok_or_else(|| eyre::eyre!("one of wallet_endpoint or private_key must be set"))?;
        let signer = KeySigner::new(key)?;
        run(request, &signer, provider, &network, &metrics).await
    };

    match outcome {
        Ok(block_number) => {
            info!(block_number, "Withdrawal complete");
            Ok(())
        }
        Err(e) => Err(eyre::eyre!(translate(&e.to_string()))),
    }
}

/// Wire the pipeline components and drive one withdrawal to its terminal
/// event.
async fn run<S, P>(
    request: WithdrawalRequest,
    signer: &S,
    provider: P,
    network: &NetworkConfig,
    metrics: &Metrics,
) -> Result<u64, PipelineError>
where
    S: DigestSigner,
    P: Provider + Clone + 'static,
{
    let vault_reader = OnchainVault::new(provider.clone());
    let chain = NodeReader::new(provider.clone());
    let oracle = GasPriceOracle::new(network.gas_price_endpoint.clone());
    let relay = Arc::new(FlashbotsClient::new(network.relay, provider));

    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_progress(rx, metrics.clone()));

    metrics.record_attempt();
    let started = Instant::now();

    let result =
        unstake_and_claim(request, signer, &vault_reader, &chain, &oracle, relay, &tx).await;

    // Close the channel so the reporter drains and exits even when no
    // terminal event was emitted.
    drop(tx);
    metrics.record_duration(started.elapsed());

    if let Err(e) = reporter.await {
        warn!(error = %e, "Progress reporter task failed");
    }

    result
}
