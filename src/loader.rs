//! Transaction and profit file parsers. Malformed lines and out-of-range
//! tokens are warnings, not failures; only I/O errors (a file that can't
//! be opened or read) propagate as an error, turning a missing input file
//! into a clean non-zero exit instead of a panic.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

use crate::model::{Database, ProfitTable, Transaction};

/// Counts of tokens/lines dropped while loading, surfaced to the caller
/// instead of only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadDiagnostics {
    pub skipped_transaction_tokens: usize,
    pub skipped_profit_lines: usize,
}

/// Parses a transaction file: one transaction per non-blank line, tokens
/// of the form `item:quantity:probability`, TIDs assigned 1..N by line
/// order. A token with a non-positive quantity or a probability outside
/// (0,1] is skipped with a warning; the rest of the line is still parsed.
pub fn load_transactions(path: impl AsRef<Path>) -> Result<(Database, LoadDiagnostics)> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening transaction file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut transactions = Vec::new();
    let mut diagnostics = LoadDiagnostics::default();
    let mut tid = 0u32;

    for line in reader.lines() {
        let line = line.with_context(|| format!("reading transaction file {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        tid += 1;
        let mut transaction = Transaction::new(tid);
        for token in line.split_whitespace() {
            match parse_transaction_token(token) {
                Some((item, quantity, probability)) => transaction.set_item(item, quantity, probability),
                None => {
                    diagnostics.skipped_transaction_tokens += 1;
                    warn!("skipping malformed transaction token {:?} on line {}", token, tid);
                }
            }
        }
        transactions.push(transaction);
    }

    if diagnostics.skipped_transaction_tokens > 0 {
        warn!("skipped {} malformed transaction tokens in total", diagnostics.skipped_transaction_tokens);
    }

    Ok((Database::new(transactions), diagnostics))
}

fn parse_transaction_token(token: &str) -> Option<(u32, u32, f64)> {
    let mut parts = token.splitn(3, ':');
    let item: u32 = parts.next()?.parse().ok()?;
    let quantity: u32 = parts.next()?.parse().ok()?;
    let probability: f64 = parts.next()?.parse().ok()?;
    if quantity == 0 || !(probability > 0.0 && probability <= 1.0) {
        return None;
    }
    Some((item, quantity, probability))
}

/// Parses a profit file: one entry per line, `itemId profit` separated by
/// whitespace or a colon. Malformed lines are skipped with a warning.
pub fn load_profits(path: impl AsRef<Path>) -> Result<(ProfitTable, LoadDiagnostics)> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening profit file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut profits = ProfitTable::new();
    let mut diagnostics = LoadDiagnostics::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading profit file {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_profit_line(line) {
            Some((item, profit)) => profits.insert(item, profit),
            None => {
                diagnostics.skipped_profit_lines += 1;
                warn!("skipping malformed profit line {} ({:?})", line_no + 1, line);
            }
        }
    }

    if diagnostics.skipped_profit_lines > 0 {
        warn!("skipped {} malformed profit lines in total", diagnostics.skipped_profit_lines);
    }

    Ok((profits, diagnostics))
}

fn parse_profit_line(line: &str) -> Option<(u32, f64)> {
    let normalized = line.replace(':', " ");
    let mut parts = normalized.split_whitespace();
    let item: u32 = parts.next()?.parse().ok()?;
    let profit: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((item, profit))
}
