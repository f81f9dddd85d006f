#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;
use metis_balance_agent::blockchain::{models::RpcError, ChainReader};

pub const TOKEN: &str = "0x00000000000000000000000000000000000000Aa";
pub const WALLET: &str = "0x1111111111111111111111111111111111111111";

pub const CALLS: [&str; 5] = ["symbol()", "decimals()", "name()", "totalSupply()", "balanceOf(address)"];

pub enum Reply {
    Data(Vec<u8>),
    Empty,
    Revert(&'static str),
}

/// In-memory chain reader answering by function selector and recording
/// every call it receives.
pub struct MockReader {
    replies: HashMap<[u8; 4], Reply>,
    calls: Mutex<Vec<(Address, &'static str)>>,
}

impl MockReader {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn token(name: &str, symbol: &str, decimals: u8, total_supply: U256, balance: U256) -> Self {
        Self::new()
            .with("name()", Reply::Data(encode(&[Token::String(name.into())])))
            .with("symbol()", Reply::Data(encode(&[Token::String(symbol.into())])))
            .with("decimals()", Reply::Data(encode(&[Token::Uint(U256::from(decimals))])))
            .with("totalSupply()", Reply::Data(encode(&[Token::Uint(total_supply)])))
            .with("balanceOf(address)", Reply::Data(encode(&[Token::Uint(balance)])))
    }

    pub fn with(mut self, signature: &str, reply: Reply) -> Self {
        self.replies.insert(id(signature), reply);
        self
    }

    /// Signatures of the calls made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|(_, sig)| *sig).collect()
    }

    pub fn targets(&self) -> Vec<Address> {
        self.calls.lock().unwrap().iter().map(|(to, _)| *to).collect()
    }
}

impl ChainReader for MockReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let selector: [u8; 4] = data[..4].try_into().unwrap();
        let signature = CALLS
            .iter()
            .copied()
            .find(|sig| id(sig) == selector)
            .unwrap_or("unknown");
        self.calls.lock().unwrap().push((to, signature));

        match self.replies.get(&selector) {
            Some(Reply::Data(bytes)) => Ok(Bytes::from(bytes.clone())),
            Some(Reply::Revert(message)) => Err(RpcError::Node {
                code: 3,
                message: message.to_string(),
            }),
            Some(Reply::Empty) | None => Ok(Bytes::new()),
        }
    }
}

/// TestToken / TT / 18 decimals / supply 10^18, holding `balance`.
pub fn test_token(balance: U256) -> MockReader {
    MockReader::token("TestToken", "TT", 18, U256::exp10(18), balance)
}
