//! Command dispatch
//!
//! Turns chat updates into state changes and replies. Commands are handled
//! one at a time; trade loops run beside the poller as sessions.

use jupiter_arb_core::chain::ChainGateway;
use jupiter_arb_core::engine::{EngineParams, TradeEngine};
use jupiter_arb_core::jupiter::QuoteSource;
use jupiter_arb_core::notify::Notifier;
use jupiter_arb_core::route_map::RouteMap;
use jupiter_arb_core::state::SharedState;
use jupiter_arb_core::ArbitrageResult;
use solana_sdk::signature::Keypair;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::commands::Command;
use crate::sessions::SessionRegistry;
use crate::telegram::{ChatNotifier, TelegramClient, Update};

/// Pause after a failed getUpdates before polling again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct Dispatcher {
    telegram: Arc<TelegramClient>,
    quotes: Arc<dyn QuoteSource>,
    gateway: Arc<dyn ChainGateway>,
    route_map: RouteMap,
    state: SharedState,
    params: EngineParams,
    sessions: SessionRegistry,
}

impl Dispatcher {
    pub fn new(
        telegram: Arc<TelegramClient>,
        quotes: Arc<dyn QuoteSource>,
        gateway: Arc<dyn ChainGateway>,
        route_map: RouteMap,
        state: SharedState,
        params: EngineParams,
    ) -> Self {
        Self {
            telegram,
            quotes,
            gateway,
            route_map,
            state,
            params,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Poll for updates forever
    pub async fn run(&self, poll_timeout_secs: u64) {
        info!("📨 Listening for chat commands...");
        let mut offset = None;

        loop {
            let updates = match self.telegram.get_updates(offset, poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("Failed to fetch updates: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                self.handle_update(update).await;
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text else {
            return;
        };
        let chat_id = message.chat.id;

        if let Some(reply) = self.handle_text(chat_id, &text).await {
            if let Err(e) = self.telegram.send_message(chat_id, &reply).await {
                warn!("Failed to reply to chat {}: {}", chat_id, e);
            }
        }
    }

    /// Reply for `text`, `None` when it is not a command
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> Option<String> {
        let command = match Command::parse(text) {
            Ok(Some(command)) => command,
            Ok(None) => {
                debug!("Ignoring message from chat {}: {:?}", chat_id, text);
                return None;
            }
            Err(e) => {
                warn!("Rejected command from chat {}: {}", chat_id, e);
                return Some(e.to_string());
            }
        };

        debug!("Chat {} -> {:?}", chat_id, command);
        match self.execute(chat_id, command).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!("Command failed for chat {}: {}", chat_id, e);
                Some(format!("Error: {}", e))
            }
        }
    }

    async fn execute(&self, chat_id: i64, command: Command) -> ArbitrageResult<String> {
        let reply = match command {
            Command::Start => "Bot is now running!".to_string(),
            Command::SetTradeAmount(amount) => {
                self.state.write().await.set_trade_amount(amount);
                info!("⚙️ Trade amount set to {}", amount);
                format!("Trade amount set to: {}", amount)
            }
            Command::CreateWallet => {
                let pubkey = self.state.write().await.replace_wallet(Keypair::new());
                info!("👛 New wallet created: {}", pubkey);
                format!("New wallet created.\nPublic Key: {}", pubkey)
            }
            Command::ShowWallet => {
                let pubkey = self.state.read().await.wallet_pubkey();
                format!("Current Wallet's Public Key: {}", pubkey)
            }
            Command::ShowLastTradeStats => {
                "Last trade statistics: [Implement your logic here]".to_string()
            }
            Command::Swap => self.start_session(chat_id).await?,
            Command::Stop => {
                if self.sessions.stop(chat_id).await {
                    "Trading stopped.".to_string()
                } else {
                    "Trading is not running.".to_string()
                }
            }
        };
        Ok(reply)
    }

    async fn start_session(&self, chat_id: i64) -> ArbitrageResult<String> {
        if self.sessions.is_running(chat_id).await {
            return Ok("Trading is already running.".to_string());
        }

        let notifier: Arc<dyn Notifier> =
            Arc::new(ChatNotifier::new(self.telegram.clone(), chat_id));
        let engine = TradeEngine::new(
            self.quotes.clone(),
            self.gateway.clone(),
            notifier.clone(),
            self.route_map.clone(),
            self.state.clone(),
            self.params.clone(),
        )?;

        let session = async move {
            let err = engine.run().await;
            error!("❌ Trading session for chat {} ended: {}", chat_id, err);
            if let Err(e) = notifier.send_text(&format!("Trading stopped: {}", err)).await {
                warn!("Failed to deliver session alert: {}", e);
            }
        };

        if self.sessions.start(chat_id, session).await {
            Ok("Trading started.".to_string())
        } else {
            Ok("Trading is already running.".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jupiter_arb_core::chain::RpcChainGateway;
    use jupiter_arb_core::http::create_client;
    use jupiter_arb_core::jupiter::JupiterClient;
    use jupiter_arb_core::state::TradingState;
    use rust_decimal::Decimal;

    fn dispatcher(state: SharedState) -> Dispatcher {
        let telegram = TelegramClient::new("http://127.0.0.1:9", "1:test", Duration::from_secs(1))
            .unwrap();
        let quotes = JupiterClient::new(
            "http://127.0.0.1:9",
            Decimal::new(5, 1),
            create_client(Duration::from_secs(1)).unwrap(),
        );
        Dispatcher::new(
            Arc::new(telegram),
            Arc::new(quotes),
            Arc::new(RpcChainGateway::new("http://127.0.0.1:9", 0)),
            RouteMap::new(vec!["So11111111111111111111111111111111111111112".to_string()]),
            state,
            EngineParams::default(),
        )
    }

    #[tokio::test]
    async fn test_create_wallet_then_show_wallet() {
        let state = TradingState::shared(Keypair::new(), 5_000_000);
        let dispatcher = dispatcher(state.clone());
        let old_pubkey = state.read().await.wallet_pubkey().to_string();

        let created = dispatcher.handle_text(1, "/create_wallet").await.unwrap();
        let pubkey = state.read().await.wallet_pubkey().to_string();
        assert_ne!(pubkey, old_pubkey);
        assert_eq!(created, format!("New wallet created.\nPublic Key: {}", pubkey));

        let shown = dispatcher.handle_text(1, "/show_wallet").await.unwrap();
        assert_eq!(shown, format!("Current Wallet's Public Key: {}", pubkey));
        assert!(!shown.contains(&old_pubkey));
    }

    #[tokio::test]
    async fn test_trade_amount_survives_bad_input() {
        let state = TradingState::shared(Keypair::new(), 5_000_000);
        let dispatcher = dispatcher(state.clone());

        assert_eq!(
            dispatcher.handle_text(1, "/set_trade_amount x y 7000000").await.as_deref(),
            Some("Trade amount set to: 7000000")
        );
        let rejected = dispatcher.handle_text(1, "/set_trade_amount lots").await.unwrap();
        assert!(rejected.contains("lots"));
        assert_eq!(state.read().await.trade_amount(), 7_000_000);
    }

    #[tokio::test]
    async fn test_fixed_replies() {
        let dispatcher = dispatcher(TradingState::shared(Keypair::new(), 1));
        assert_eq!(
            dispatcher.handle_text(1, "/start").await.as_deref(),
            Some("Bot is now running!")
        );
        assert_eq!(
            dispatcher.handle_text(1, "/show_last_trade_stats").await.as_deref(),
            Some("Last trade statistics: [Implement your logic here]")
        );
        assert_eq!(dispatcher.handle_text(1, "gm").await, None);
        assert_eq!(
            dispatcher.handle_text(1, "/stop").await.as_deref(),
            Some("Trading is not running.")
        );
    }

    #[tokio::test]
    async fn test_swap_starts_one_session_per_chat() {
        let dispatcher = dispatcher(TradingState::shared(Keypair::new(), 1));

        assert_eq!(
            dispatcher.handle_text(5, "/swap").await.as_deref(),
            Some("Trading started.")
        );
        assert_eq!(
            dispatcher.handle_text(5, "/swap").await.as_deref(),
            Some("Trading is already running.")
        );
        assert_eq!(
            dispatcher.handle_text(5, "/stop").await.as_deref(),
            Some("Trading stopped.")
        );
        dispatcher.sessions().shutdown().await;
    }
}
