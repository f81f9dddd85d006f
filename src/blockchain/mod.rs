// src/blockchain/mod.rs

pub mod client;
pub use client::{ChainReader, RpcChainReader};

pub mod models;
pub mod network;
pub mod rpc;
pub mod services;

pub use network::NetworkConfig;
pub use services::{validate_address, BalanceAdapter};
