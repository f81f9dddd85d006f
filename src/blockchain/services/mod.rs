// src/blockchain/services/mod.rs

pub mod balance;
pub mod erc20;

pub use balance::{parse_address, validate_address, BalanceAdapter};
