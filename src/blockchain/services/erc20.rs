// src/blockchain/services/erc20.rs

use anyhow::{anyhow, Context, Result};
use ethers_core::abi::{decode, Abi, Function, ParamType, Token};
use ethers_core::types::{Address, Bytes, U256};

use crate::blockchain::models::RpcError;

/// Minimal ERC20 read interface: the five views a balance check needs.
pub const ERC20_ABI: &str = r#"[
    {
        "inputs": [{"internalType": "address", "name": "account", "type": "address"}],
        "name": "balanceOf",
        "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
        "stateMutability": "view",
        "type": "function"
    },
    {
        "inputs": [],
        "name": "decimals",
        "outputs": [{"internalType": "uint8", "name": "", "type": "uint8"}],
        "stateMutability": "view",
        "type": "function"
    },
    {
        "inputs": [],
        "name": "name",
        "outputs": [{"internalType": "string", "name": "", "type": "string"}],
        "stateMutability": "view",
        "type": "function"
    },
    {
        "inputs": [],
        "name": "symbol",
        "outputs": [{"internalType": "string", "name": "", "type": "string"}],
        "stateMutability": "view",
        "type": "function"
    },
    {
        "inputs": [],
        "name": "totalSupply",
        "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
        "stateMutability": "view",
        "type": "function"
    }
]"#;

/// Encoders and decoders for the fixed ERC20 ABI.
#[derive(Debug, Clone)]
pub struct Erc20 {
    balance_of: Function,
    decimals: Function,
    name: Function,
    symbol: Function,
    total_supply: Function,
}

impl Erc20 {
    pub fn new() -> Result<Self> {
        let abi: Abi = serde_json::from_str(ERC20_ABI).context("Invalid ERC20 ABI JSON")?;
        let function = |name: &str| -> Result<Function> {
            abi.function(name)
                .cloned()
                .map_err(|e| anyhow!("ERC20 ABI is missing {}: {}", name, e))
        };
        Ok(Self {
            balance_of: function("balanceOf")?,
            decimals: function("decimals")?,
            name: function("name")?,
            symbol: function("symbol")?,
            total_supply: function("totalSupply")?,
        })
    }

    pub fn name_call(&self) -> Result<Bytes, RpcError> {
        encode_call(&self.name, &[])
    }

    pub fn symbol_call(&self) -> Result<Bytes, RpcError> {
        encode_call(&self.symbol, &[])
    }

    pub fn decimals_call(&self) -> Result<Bytes, RpcError> {
        encode_call(&self.decimals, &[])
    }

    pub fn total_supply_call(&self) -> Result<Bytes, RpcError> {
        encode_call(&self.total_supply, &[])
    }

    pub fn balance_of_call(&self, owner: Address) -> Result<Bytes, RpcError> {
        encode_call(&self.balance_of, &[Token::Address(owner)])
    }

    pub fn decode_name(&self, output: &[u8]) -> Result<String, RpcError> {
        decode_string(&self.name, output)
    }

    pub fn decode_symbol(&self, output: &[u8]) -> Result<String, RpcError> {
        decode_string(&self.symbol, output)
    }

    pub fn decode_decimals(&self, output: &[u8]) -> Result<u8, RpcError> {
        let n = decode_uint(&self.decimals, output)?;
        if n > U256::from(u8::MAX) {
            return Err(RpcError::UnexpectedOutput(format!(
                "decimals() returned {} which does not fit in uint8",
                n
            )));
        }
        Ok(n.low_u32() as u8)
    }

    pub fn decode_total_supply(&self, output: &[u8]) -> Result<U256, RpcError> {
        decode_uint(&self.total_supply, output)
    }

    pub fn decode_balance(&self, output: &[u8]) -> Result<U256, RpcError> {
        decode_uint(&self.balance_of, output)
    }
}

fn encode_call(function: &Function, args: &[Token]) -> Result<Bytes, RpcError> {
    Ok(Bytes::from(function.encode_input(args)?))
}

fn decode_single(function: &Function, output: &[u8]) -> Result<Token, RpcError> {
    if output.is_empty() {
        return Err(RpcError::EmptyResult);
    }
    function
        .decode_output(output)?
        .into_iter()
        .next()
        .ok_or_else(|| RpcError::UnexpectedOutput(format!("{}() returned nothing", function.name)))
}

fn decode_uint(function: &Function, output: &[u8]) -> Result<U256, RpcError> {
    match decode_single(function, output)? {
        Token::Uint(n) => Ok(n),
        other => Err(RpcError::UnexpectedOutput(format!(
            "{}() returned {:?}, expected uint",
            function.name, other
        ))),
    }
}

// Some older tokens return bytes32 for name/symbol instead of string.
fn decode_string(function: &Function, output: &[u8]) -> Result<String, RpcError> {
    if output.is_empty() {
        return Err(RpcError::EmptyResult);
    }
    if let Ok(Token::String(s)) = decode_single(function, output) {
        return Ok(s);
    }
    if let Ok(tokens) = decode(&[ParamType::FixedBytes(32)], output) {
        if let Some(Token::FixedBytes(b)) = tokens.into_iter().next() {
            let trimmed: Vec<u8> = b.into_iter().take_while(|c| *c != 0u8).collect();
            if let Ok(s) = String::from_utf8(trimmed) {
                return Ok(s);
            }
        }
    }
    Err(RpcError::UnexpectedOutput(format!(
        "{}() returned data that is neither string nor bytes32",
        function.name
    )))
}
