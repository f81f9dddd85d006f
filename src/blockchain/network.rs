// src/blockchain/network.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const METIS_SEPOLIA_CHAIN_ID: u64 = 59902;
pub const METIS_HYPERION_CHAIN_ID: u64 = 133717;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown network '{0}' (expected sepolia or hyperion)")]
pub struct UnknownNetwork(pub String);

/// Connection details for one Metis deployment target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl NetworkConfig {
    pub fn metis_sepolia() -> Self {
        Self {
            chain_id: METIS_SEPOLIA_CHAIN_ID,
            name: "Metis Sepolia".to_string(),
            rpc_url: "https://sepolia.metisdevops.link".to_string(),
            explorer_url: "https://sepolia-explorer.metisdevops.link".to_string(),
        }
    }

    pub fn metis_hyperion() -> Self {
        Self {
            chain_id: METIS_HYPERION_CHAIN_ID,
            name: "Metis Hyperion Testnet".to_string(),
            rpc_url: "https://hyperion-testnet.metisdevops.link".to_string(),
            explorer_url: "https://hyperion-testnet-explorer.metisdevops.link".to_string(),
        }
    }

    /// Resolves a user-supplied network name or chain id to a preset.
    pub fn resolve(input: &str) -> Result<Self, UnknownNetwork> {
        match normalize_network_alias(input).as_str() {
            "sepolia" | "metis-sepolia" | "59902" => Ok(Self::metis_sepolia()),
            "hyperion" | "metis-hyperion" | "hyperion-testnet" | "133717" => {
                Ok(Self::metis_hyperion())
            }
            _ => Err(UnknownNetwork(input.to_string())),
        }
    }

    pub fn token_url(&self, contract: &str) -> String {
        format!("{}/token/{}", self.explorer_url.trim_end_matches('/'), contract)
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url.trim_end_matches('/'), address)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::metis_sepolia()
    }
}

// Lowercase, map spaces/underscores to '-', collapse repeated dashes.
fn normalize_network_alias(input: &str) -> String {
    let mut s = input.trim().to_lowercase().replace([' ', '_'], "-");
    while s.contains("--") {
        s = s.replace("--", "-");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_aliases() {
        assert_eq!(NetworkConfig::resolve("Sepolia").unwrap().chain_id, 59902);
        assert_eq!(NetworkConfig::resolve("metis_sepolia").unwrap().chain_id, 59902);
        assert_eq!(NetworkConfig::resolve(" Metis  Hyperion ").unwrap().chain_id, 133717);
        assert_eq!(NetworkConfig::resolve("133717").unwrap().name, "Metis Hyperion Testnet");
        assert_eq!(
            NetworkConfig::resolve("mainnet"),
            Err(UnknownNetwork("mainnet".to_string()))
        );
    }

    #[test]
    fn explorer_links() {
        let mut net = NetworkConfig::metis_sepolia();
        net.explorer_url.push('/');
        assert_eq!(
            net.token_url("0xabc"),
            "https://sepolia-explorer.metisdevops.link/token/0xabc"
        );
        assert_eq!(
            net.address_url("0xdef"),
            "https://sepolia-explorer.metisdevops.link/address/0xdef"
        );
    }
}
