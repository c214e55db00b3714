use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::error::ArbitrageResult;

/// Long-lived client with a hard per-request timeout
pub fn create_client(timeout: Duration) -> ArbitrageResult<Client> {
    let client = ClientBuilder::new()
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
