// src/lib.rs

use std::sync::Arc;

// Re-export commonly used types
pub use ethers::types::{Address, U256};

// Re-export modules
pub mod agent;
pub mod api;
pub mod blockchain;
pub mod cli;
pub mod config;

use agent::{Agent, Backend};
use blockchain::{BalanceAdapter, RpcChainReader};

/// Application state shared by the CLI session and the HTTP handlers.
pub struct AppState<R = RpcChainReader, M = Backend> {
    /// Application configuration
    pub config: Arc<config::Config>,
    /// Token balance reads against the configured network
    pub adapter: Arc<BalanceAdapter<R>>,
    /// Conversational assistant with memory and optional knowledge base
    pub agent: Arc<Agent<M>>,
}

impl<R, M> Clone for AppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            adapter: Arc::clone(&self.adapter),
            agent: Arc::clone(&self.agent),
        }
    }
}

impl<R, M> AppState<R, M> {
    pub fn new(config: config::Config, adapter: BalanceAdapter<R>, agent: Agent<M>) -> Self {
        Self {
            config: Arc::new(config),
            adapter: Arc::new(adapter),
            agent: Arc::new(agent),
        }
    }
}
