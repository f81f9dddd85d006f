//! Knowledge base for grounding assistant replies.
//!
//! The store is a list of text chunks ranked by plain keyword overlap with
//! the query; there is no embedding or vector index behind it.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::blockchain::NetworkConfig;

pub const DEFAULT_CHUNK_CHARS: usize = 600;

const STOPWORDS: &[&str] = &[
    "the", "and", "what", "how", "for", "are", "you", "does", "with", "this", "that", "about",
    "can", "tell", "why", "which", "from", "into", "its", "is",
];

/// Markdown knowledge about Metis, the selected network and ERC20 tokens.
pub fn builtin_knowledge(network: &NetworkConfig) -> String {
    format!(
        r#"# Metis L2 Blockchain Information

## What is Metis?
Metis is a Layer 2 scaling network for Ethereum with fast, low-cost transactions.
It is built on optimistic rollup technology, inheriting Ethereum security while scaling throughput.

## {name}
- Chain ID: {chain_id}
- RPC URL: {rpc_url}
- Explorer: {explorer_url}
- Purpose: testing environment for developers

## ERC20 Tokens
ERC20 is the technical standard for fungible tokens on Ethereum and compatible chains such as Metis.

### Key ERC20 Functions
- balanceOf(address): token balance held by an address
- decimals(): number of decimal places the token uses
- name(): full name of the token
- symbol(): trading symbol
- totalSupply(): total token supply

### Token Decimals
Balances are stored on chain as integers. The human readable balance is
raw balance / 10^decimals. A raw balance of 1000000000000000000 with 18 decimals is 1.0 tokens.

## Common Token Decimal Values
- 18 decimals: most standard tokens, such as DAI
- 6 decimals: USDC, USDT and other stablecoins
- 8 decimals: Bitcoin-pegged tokens

## Wallet Address Validation
A valid Ethereum or Metis address is 42 characters long, starts with 0x,
and contains only hexadecimal characters (0-9, a-f, A-F).

## Troubleshooting
- Invalid address format: check the length and the hex characters
- Contract not found or call returned no data: verify the contract address on the explorer
- RPC errors or timeouts: network connectivity or node issues, try again later

## Best Practices
- Validate addresses before making calls
- Show both raw and formatted balances for transparency
- Format balances with the token's own decimals
"#,
        name = network.name,
        chain_id = network.chain_id,
        rpc_url = network.rpc_url,
        explorer_url = network.explorer_url,
    )
}

/// Splits `text` on blank lines and packs paragraphs into chunks of at most
/// `max_chars`. A top-level heading (`#` or `##`) always starts a new chunk.
/// A single paragraph longer than `max_chars` becomes its own chunk.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n");
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let is_section = paragraph.starts_with("# ") || paragraph.starts_with("## ");
        let too_long = current.len() + paragraph.len() + 2 > max_chars;
        if !current.is_empty() && (is_section || too_long) {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(&t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    chunks: Vec<String>,
}

impl KnowledgeStore {
    pub fn from_text(text: &str) -> Self {
        Self {
            chunks: chunk_text(text, DEFAULT_CHUNK_CHARS),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge file {}", path.display()))?;
        let store = Self::from_text(&text);
        if store.is_empty() {
            bail!("Knowledge file {} is empty", path.display());
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Up to `limit` chunks sharing at least one term with `query`, best
    /// match first; ties keep document order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, &str)> = self
            .chunks
            .iter()
            .map(|chunk| {
                let lower = chunk.to_lowercase();
                let score = terms.iter().filter(|t| lower.contains(t.as_str())).count();
                (score, chunk.as_str())
            })
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(limit).map(|(_, chunk)| chunk).collect()
    }
}
