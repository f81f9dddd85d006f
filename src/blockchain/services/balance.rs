use crate::blockchain::{
    client::ChainReader,
    models::{BalanceError, BalanceReport, RpcError, TokenAmount, TokenDescriptor},
    services::erc20::Erc20,
};
use anyhow::Result;
use chrono::Utc;
use ethers::types::{Address, U256};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// True iff `address` is `0x` followed by exactly 40 hex digits.
/// No checksum verification.
pub fn validate_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn parse_address(address: &str) -> Result<Address, BalanceError> {
    if !validate_address(address) {
        return Err(BalanceError::InvalidAddress(address.to_string()));
    }
    Address::from_str(address).map_err(|_| BalanceError::InvalidAddress(address.to_string()))
}

/// Reads ERC20 metadata and balances through a [`ChainReader`].
pub struct BalanceAdapter<R> {
    reader: R,
    erc20: Erc20,
}

impl<R: ChainReader> BalanceAdapter<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            reader,
            erc20: Erc20::new()?,
        })
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Reads `symbol`, `decimals`, `name` and `totalSupply`, in that order.
    /// Stops at the first failing call.
    pub async fn fetch_token_descriptor(
        &self,
        contract: Address,
    ) -> Result<TokenDescriptor, BalanceError> {
        let token_read = |call: &'static str| move |source: RpcError| BalanceError::TokenRead { call, source };

        let symbol = self
            .read(contract, self.erc20.symbol_call(), |out| self.erc20.decode_symbol(out))
            .await
            .map_err(token_read("symbol"))?;
        let decimals = self
            .read(contract, self.erc20.decimals_call(), |out| self.erc20.decode_decimals(out))
            .await
            .map_err(token_read("decimals"))?;
        let name = self
            .read(contract, self.erc20.name_call(), |out| self.erc20.decode_name(out))
            .await
            .map_err(token_read("name"))?;
        let total_supply = self
            .read(contract, self.erc20.total_supply_call(), |out| {
                self.erc20.decode_total_supply(out)
            })
            .await
            .map_err(token_read("totalSupply"))?;

        debug!(%symbol, decimals, "token descriptor fetched");
        Ok(TokenDescriptor {
            name,
            symbol,
            decimals,
            total_supply,
        })
    }

    /// One `balanceOf(wallet)` call, scaled by `decimals`.
    pub async fn fetch_balance(
        &self,
        contract: Address,
        wallet: Address,
        decimals: u8,
    ) -> Result<(U256, TokenAmount), BalanceError> {
        let raw = self
            .read(contract, self.erc20.balance_of_call(wallet), |out| {
                self.erc20.decode_balance(out)
            })
            .await
            .map_err(BalanceError::BalanceRead)?;
        Ok((raw, TokenAmount::new(raw, decimals)))
    }

    /// Validate both addresses, read the token, read the balance.
    /// The first failure aborts with no partial report.
    pub async fn build_report(
        &self,
        contract: &str,
        wallet: &str,
    ) -> Result<BalanceReport, BalanceError> {
        let contract_addr = parse_address(contract)?;
        let wallet_addr = parse_address(wallet)?;

        let result = self.assemble(contract, wallet, contract_addr, wallet_addr).await;

        match &result {
            Ok(report) => info!(
                contract,
                wallet,
                symbol = %report.token.symbol,
                balance = %report.formatted_balance,
                "balance report built"
            ),
            Err(e) => warn!(contract, wallet, error = %e, "balance check failed"),
        }
        result
    }

    async fn assemble(
        &self,
        contract: &str,
        wallet: &str,
        contract_addr: Address,
        wallet_addr: Address,
    ) -> Result<BalanceReport, BalanceError> {
        let token = self.fetch_token_descriptor(contract_addr).await?;
        let (raw_balance, formatted_balance) = self
            .fetch_balance(contract_addr, wallet_addr, token.decimals)
            .await?;
        Ok(BalanceReport {
            token,
            contract: contract.to_string(),
            wallet: wallet.to_string(),
            raw_balance,
            formatted_balance,
            checked_at: Utc::now(),
        })
    }

    async fn read<T>(
        &self,
        contract: Address,
        calldata: Result<ethers::types::Bytes, RpcError>,
        decode: impl FnOnce(&[u8]) -> Result<T, RpcError>,
    ) -> Result<T, RpcError> {
        let output = self.reader.call(contract, calldata?).await?;
        decode(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_0x_and_40_hex_digits() {
        assert!(validate_address("0x0000000000000000000000000000000000000000"));
        assert!(validate_address("0xAbCdEf0123456789abcdef0123456789ABCDEF01"));

        assert!(!validate_address(""));
        assert!(!validate_address("0x"));
        assert!(!validate_address("0x123"));
        assert!(!validate_address("0x00000000000000000000000000000000000000000"));
        assert!(!validate_address("00000000000000000000000000000000000000000000"));
        assert!(!validate_address("0X0000000000000000000000000000000000000000"));
        assert!(!validate_address("0x000000000000000000000000000000000000000g"));
        assert!(!validate_address("0x00000000000000000000000000000000000000 0"));
        // 42 bytes but multi-byte characters
        assert!(!validate_address("0x00000000000000000000000000000000000000é"));
    }

    #[test]
    fn parse_rejects_invalid_with_input() {
        match parse_address("0x123") {
            Err(BalanceError::InvalidAddress(a)) => assert_eq!(a, "0x123"),
            other => panic!("unexpected: {:?}", other),
        }
        let addr = parse_address("0x00000000000000000000000000000000000000Ff").unwrap();
        assert_eq!(addr.to_low_u64_be(), 0xff);
    }
}
