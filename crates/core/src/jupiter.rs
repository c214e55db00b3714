//! Jupiter Quote Client
//!
//! Fetches round-trip quotes and serialized swap transactions from the
//! Jupiter aggregator HTTP API.

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{ArbitrageError, ArbitrageResult};
use crate::http::create_client;
use crate::types::{QuoteResponse, Route, SwapRequest, SwapTransactions};

/// Source of priced routes and the transactions that execute them
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Best route for `amount` base units of `input_mint`, `None` when there is none
    async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> ArbitrageResult<Option<Route>>;

    /// Serialized transactions for a route returned by `get_quote`
    async fn get_swap_transactions(
        &self,
        route: &Route,
        user_public_key: &str,
    ) -> ArbitrageResult<SwapTransactions>;
}

#[derive(Debug, Clone)]
pub struct JupiterClient {
    client: Client,
    base_url: String,
    slippage_pct: Decimal,
}

impl JupiterClient {
    pub fn new(base_url: &str, slippage_pct: Decimal, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            slippage_pct,
        }
    }

    pub fn from_config(config: &Config) -> ArbitrageResult<Self> {
        let client = create_client(config.http_timeout())?;
        Ok(Self::new(&config.jupiter_api_url, config.slippage_pct, client))
    }

    fn quote_url(&self) -> String {
        format!("{}/quote", self.base_url)
    }

    fn swap_url(&self) -> String {
        format!("{}/swap", self.base_url)
    }

    fn quote_request(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> ArbitrageResult<Request> {
        let amount = amount.to_string();
        let slippage = self.slippage_pct.to_string();
        let request = self
            .client
            .get(self.quote_url())
            .query(&[
                ("inputMint", input_mint),
                ("outputMint", output_mint),
                ("amount", amount.as_str()),
                ("slippage", slippage.as_str()),
            ])
            .build()?;
        Ok(request)
    }
}

/// Map non-2xx into `QuoteService`, decode the rest
async fn read_json<T: DeserializeOwned>(response: Response) -> ArbitrageResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ArbitrageError::QuoteService {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ArbitrageError::Decode(e.to_string()))
}

#[async_trait]
impl QuoteSource for JupiterClient {
    async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> ArbitrageResult<Option<Route>> {
        debug!("Fetching quote {} -> {} for {}", input_mint, output_mint, amount);
        let request = self.quote_request(input_mint, output_mint, amount)?;
        let response = self.client.execute(request).await?;

        let quote: QuoteResponse = read_json(response).await?;
        quote.best_route()
    }

    async fn get_swap_transactions(
        &self,
        route: &Route,
        user_public_key: &str,
    ) -> ArbitrageResult<SwapTransactions> {
        let request = SwapRequest {
            route: &route.payload,
            user_public_key: user_public_key.to_string(),
            wrap_unwrap_sol: false,
        };

        debug!("Requesting swap transactions...");
        let response = self
            .client
            .post(self.swap_url())
            .json(&request)
            .send()
            .await?;

        read_json(response).await
    }
}
