//! Jupiter Round-Trip Arbitrage Bot
//!
//! Telegram-controlled bot that trades stable → token → stable round trips
//! through the Jupiter aggregator.

use anyhow::Result;
use jupiter_arb_core::chain::RpcChainGateway;
use jupiter_arb_core::config::Config;
use jupiter_arb_core::engine::EngineParams;
use jupiter_arb_core::jupiter::JupiterClient;
use jupiter_arb_core::route_map::RouteMap;
use jupiter_arb_core::state::TradingState;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod commands;
mod dispatcher;
mod logging;
mod sessions;
mod telegram;
mod wallet;

use dispatcher::Dispatcher;
use telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    logging::setup();

    let config = Config::from_env()?;

    info!("🚀 Jupiter Arbitrage Bot starting...");
    info!("   Trade amount: {} base units", config.trade_amount);
    info!("   Slippage tolerance: {}%", config.slippage_pct);
    info!("   Mints per pass: {}", config.mint_window);
    info!("   Jupiter API: {}", config.jupiter_api_url);
    info!("   RPC URL: {}", config.solana_rpc_url);

    let route_map = RouteMap::load(config.route_map_path.as_deref())?;
    let wallet = wallet::load(config.wallet_secret_key.as_deref())?;
    let state = TradingState::shared(wallet, config.trade_amount);

    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.telegram_bot_token,
        Duration::from_secs(config.telegram_poll_timeout_secs),
    )?);
    let dispatcher = Dispatcher::new(
        telegram,
        Arc::new(JupiterClient::from_config(&config)?),
        Arc::new(RpcChainGateway::from_config(&config)),
        route_map,
        state,
        EngineParams::from_config(&config),
    );

    tokio::select! {
        _ = dispatcher.run(config.telegram_poll_timeout_secs) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("🛑 Shutdown signal received");
        }
    }

    let stopped = dispatcher.sessions().shutdown().await;
    info!("👋 Bot stopped ({} trading sessions aborted)", stopped);
    Ok(())
}
