//! Interactive terminal session.
//!
//! Reads one line at a time: `check <contract> <wallet>` runs a balance
//! check and hands the rendered report to the assistant, `exit`/`quit`/`bye`
//! ends the session, anything else is a chat message.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    agent::{prompts, LanguageModel},
    blockchain::ChainReader,
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Exit,
    Check { contract: &'a str, wallet: &'a str },
    CheckUsage,
    Chat(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let lower = line.to_lowercase();
    if matches!(lower.as_str(), "exit" | "quit" | "bye") {
        return Command::Exit;
    }

    let mut parts = line.split_whitespace();
    match parts.next() {
        Some(word) if word.eq_ignore_ascii_case("check") => match (parts.next(), parts.next()) {
            (Some(contract), Some(wallet)) => Command::Check { contract, wallet },
            _ => Command::CheckUsage,
        },
        _ => Command::Chat(line),
    }
}

pub fn banner<R, M: LanguageModel>(state: &AppState<R, M>) -> String {
    let knowledge = if state.agent.has_knowledge() {
        "✅ Knowledge base: active"
    } else {
        "⚠️ Knowledge base: disabled"
    };
    format!(
        "🤖 Metis token balance agent running on {} (chain id {})\n\
         Checks ERC20 token balances, remembers the conversation and knows about Metis L2 and ERC20 tokens.\n\
         Type 'exit' to quit.\n\n\
         Commands:\n\
         - check <contract_address> <wallet_address>  (check a token balance)\n\
         - ask about Metis L2, ERC20 tokens or blockchain concepts\n\
         - or just chat\n\
         {}\n",
        state.config.network.name, state.config.network.chain_id, knowledge
    )
}

/// Runs a balance check and renders either the report or the error message.
pub async fn check_balance<R: ChainReader, M>(
    state: &AppState<R, M>,
    contract: &str,
    wallet: &str,
) -> String {
    match state.adapter.build_report(contract, wallet).await {
        Ok(report) => report.render(&state.config.network, state.config.display_decimals),
        Err(e) => e.user_message(),
    }
}

async fn reply<R, M, O>(state: &AppState<R, M>, prompt: &str, output: &mut O) -> std::io::Result<()>
where
    M: LanguageModel,
    O: AsyncWrite + Unpin,
{
    let line = match state.agent.prompt(prompt).await {
        Ok(text) => format!("Agent: {}\n", text),
        Err(e) => format!("⚠️ Assistant unavailable: {}\n", e),
    };
    output.write_all(line.as_bytes()).await
}

pub async fn run_session<R, M, I, O>(state: &AppState<R, M>, input: I, mut output: O) -> std::io::Result<()>
where
    R: ChainReader,
    M: LanguageModel,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(b"\nYou: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            info!("EOF received, ending session");
            break;
        };

        let command = parse_command(&line);
        debug!(?command, "parsed input");
        match command {
            Command::Empty => continue,
            Command::Exit => {
                reply(state, prompts::FAREWELL, &mut output).await?;
                break;
            }
            Command::Check { contract, wallet } => {
                output.write_all("🔍 Checking token balance...\n".as_bytes()).await?;
                let report = check_balance(state, contract, wallet).await;
                output.write_all(format!("{}\n", report).as_bytes()).await?;
                reply(state, &prompts::balance_checked(&report), &mut output).await?;
            }
            Command::CheckUsage => {
                output.write_all(format!("{}\n", prompts::CHECK_USAGE).as_bytes()).await?;
                reply(state, &prompts::missing_check_arguments(), &mut output).await?;
            }
            Command::Chat(text) => reply(state, text, &mut output).await?,
        }
    }

    output.flush().await
}
