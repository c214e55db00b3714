//! Chat command parsing

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Swap,
    Stop,
    SetTradeAmount(u64),
    CreateWallet,
    ShowWallet,
    ShowLastTradeStats,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid trade amount {0:?}, expected a whole number of base units")]
    InvalidAmount(String),

    #[error("Usage: /set_trade_amount <amount>")]
    MissingAmount,
}

impl Command {
    /// `Ok(None)` for text that is not one of our commands
    pub fn parse(text: &str) -> Result<Option<Self>, CommandError> {
        let mut tokens = text.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(None);
        };
        // "/swap@my_bot" in group chats
        let name = head.split('@').next().unwrap_or(head);

        let command = match name {
            "/start" => Command::Start,
            "/swap" => Command::Swap,
            "/stop" => Command::Stop,
            "/create_wallet" => Command::CreateWallet,
            "/show_wallet" => Command::ShowWallet,
            "/show_last_trade_stats" => Command::ShowLastTradeStats,
            "/set_trade_amount" => {
                let amount = tokens.last().ok_or(CommandError::MissingAmount)?;
                let amount = amount
                    .parse::<u64>()
                    .map_err(|_| CommandError::InvalidAmount(amount.to_string()))?;
                Command::SetTradeAmount(amount)
            }
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}
