use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::core::domain::{parse_count, Chain};
use crate::core::errors::WalletGenError;

/// Wallet batch generator CLI (library-facing definitions)
#[derive(Debug, Clone, Parser)]
#[command(name = "walletgen", about = "Batch-generate ETH or SOL wallets and export them to Excel", version)]
pub struct Cli {
    /// Chain to generate wallets for (eth or sol)
    #[arg(long, value_parser = parse_chain_arg)]
    pub chain: Option<Chain>,

    /// Number of wallets to generate (> 0)
    #[arg(long, value_parser = parse_count_arg)]
    pub count: Option<u32>,

    /// Root directory for the `<chain>_wallets/` output folders
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Spreadsheet file name (defaults to `<chain>_wallets.xlsx`)
    #[arg(long)]
    pub filename: Option<String>,

    /// Skip the advisory runtime environment check
    #[arg(long)]
    pub skip_guard: bool,

    /// Print the security module status report and exit
    #[arg(long)]
    pub status: bool,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_chain_arg(s: &str) -> Result<Chain, WalletGenError> {
    s.parse()
}

fn parse_count_arg(s: &str) -> Result<u32, WalletGenError> {
    parse_count(s)
}

/// What the user asked for once flags and prompts are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub chain: Chain,
    pub count: u32,
}

impl Cli {
    /// Use the flags when both are present, otherwise ask for both interactively.
    pub fn resolve_request<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Request, WalletGenError> {
        match (self.chain, self.count) {
            (Some(chain), Some(count)) => Ok(Request { chain, count }),
            _ => prompt_request(input, output),
        }
    }
}

fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<Option<String>, WalletGenError> {
    write!(output, "{}", question).map_err(prompt_io)?;
    output.flush().map_err(prompt_io)?;
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(prompt_io)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_io(e: io::Error) -> WalletGenError {
    WalletGenError::Prompt(e.to_string())
}

/// Ask for chain then count, re-prompting until each answer is valid.
///
/// A closed input stream ends the loop with the validation error for the
/// field being asked.
pub fn prompt_request<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Request, WalletGenError> {
    writeln!(output, "\n=== Wallet Generator ===\nEnter the chain type (eth/sol)\n").map_err(prompt_io)?;

    let chain = loop {
        let Some(answer) = read_answer(input, output, "Chain (eth/sol): ")? else {
            return Err(WalletGenError::InvalidChain("no chain given before input closed".into()));
        };
        match answer.parse::<Chain>() {
            Ok(chain) => break chain,
            Err(_) => writeln!(output, "⚠️ Please enter a valid chain (eth/sol)").map_err(prompt_io)?,
        }
    };

    let count = loop {
        let Some(answer) = read_answer(input, output, "Number of wallets (>0): ")? else {
            return Err(WalletGenError::InvalidCount("no count given before input closed".into()));
        };
        match parse_count(&answer) {
            Ok(count) => break count,
            Err(WalletGenError::InvalidCount(reason)) => {
                writeln!(output, "⚠️ {}", reason).map_err(prompt_io)?
            }
            Err(other) => return Err(other),
        }
    };

    Ok(Request { chain, count })
}
