// src/blockchain/models.rs
use chrono::{DateTime, Utc};
use ethers::types::U256;
use std::fmt;
use thiserror::Error;

use crate::blockchain::network::NetworkConfig;

// --- Error types for chain reads ---

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("call returned no data (method missing or address is not a contract)")]
    EmptyResult,
    #[error("ABI codec error: {0}")]
    Abi(#[from] ethers_core::abi::Error),
    #[error("unexpected output: {0}")]
    UnexpectedOutput(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RpcError::Timeout
        } else {
            RpcError::Transport(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("invalid address format: '{0}'")]
    InvalidAddress(String),
    #[error("failed to read token {call}(): {source}")]
    TokenRead {
        call: &'static str,
        #[source]
        source: RpcError,
    },
    #[error("failed to read balance: {0}")]
    BalanceRead(#[source] RpcError),
}

impl BalanceError {
    /// The message shown to the user in place of a report.
    pub fn user_message(&self) -> String {
        match self {
            BalanceError::InvalidAddress(_) => "❌ Invalid address format. Addresses should be 42 characters long, start with '0x' and contain only hex digits".to_string(),
            BalanceError::TokenRead { call, source } => {
                format!("❌ Error reading token information ({}): {}", call, source)
            }
            BalanceError::BalanceRead(source) => format!("❌ Error checking balance: {}", source),
        }
    }
}

// --- Token models ---

/// Exact decimal amount `raw / 10^decimals`.
///
/// Formatting works on the decimal digits of `raw`, so every `u8` decimals
/// value is supported without computing `10^decimals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    /// Parses a decimal string such as `"1.5"` at the given precision.
    /// Returns `None` for malformed input, more fractional digits than
    /// `decimals`, or values that overflow 256 bits.
    pub fn parse(input: &str, decimals: u8) -> Option<Self> {
        let (whole, fraction) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) || fraction.len() > decimals as usize {
            return None;
        }
        let digits = format!(
            "{}{}{}",
            whole,
            fraction,
            "0".repeat(decimals as usize - fraction.len())
        );
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Some(Self::new(U256::zero(), decimals));
        }
        U256::from_dec_str(digits)
            .ok()
            .map(|raw| Self::new(raw, decimals))
    }

    // Whole digits and fractional digits (exactly `decimals` long).
    fn split(&self) -> (String, String) {
        let digits = self.raw.to_string();
        let scale = self.decimals as usize;
        if digits.len() <= scale {
            ("0".to_string(), format!("{:0>width$}", digits, width = scale))
        } else {
            let (whole, fraction) = digits.split_at(digits.len() - scale);
            (whole.to_string(), fraction.to_string())
        }
    }

    /// Renders with exactly `fraction_digits` fractional digits, truncating
    /// toward zero, with `,` thousands separators in the whole part.
    pub fn to_fixed(&self, fraction_digits: usize) -> String {
        let (whole, fraction) = self.split();
        let whole = group_thousands(&whole);
        if fraction_digits == 0 {
            return whole;
        }
        let mut shown: String = fraction.chars().take(fraction_digits).collect();
        while shown.len() < fraction_digits {
            shown.push('0');
        }
        format!("{}.{}", whole, shown)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, fraction) = self.split();
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            write!(f, "{}", whole)
        } else {
            write!(f, "{}.{}", whole, fraction)
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ERC20 metadata read from the token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

impl TokenDescriptor {
    pub fn total_supply_amount(&self) -> TokenAmount {
        TokenAmount::new(self.total_supply, self.decimals)
    }
}

#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub token: TokenDescriptor,
    /// Contract address as the user typed it
    pub contract: String,
    /// Wallet address as the user typed it
    pub wallet: String,
    pub raw_balance: U256,
    pub formatted_balance: TokenAmount,
    pub checked_at: DateTime<Utc>,
}

impl BalanceReport {
    /// Text block shown to the user and handed to the assistant.
    ///
    /// The balance shows `min(decimals, display_decimals)` fractional digits;
    /// total supply always shows two.
    pub fn render(&self, network: &NetworkConfig, display_decimals: u8) -> String {
        let symbol = &self.token.symbol;
        let shown = self.token.decimals.min(display_decimals) as usize;
        format!(
            "💰 Token Balance Report ({network})\n\n\
             Token Name: {name}\n\
             Symbol: {symbol}\n\
             Total Supply: {supply} {symbol}\n\
             Decimals: {decimals}\n\n\
             Wallet: {wallet}\n\
             Balance: {balance} {symbol}\n\
             Raw Balance: {raw}\n\n\
             🔍 View on Explorer:\n\
             Token: {token_url}\n\
             Wallet: {wallet_url}",
            network = network.name,
            name = self.token.name,
            supply = self.token.total_supply_amount().to_fixed(2),
            decimals = self.token.decimals,
            wallet = self.wallet,
            balance = self.formatted_balance.to_fixed(shown),
            raw = self.raw_balance,
            token_url = network.token_url(&self.contract),
            wallet_url = network.address_url(&self.wallet),
        )
    }
}
