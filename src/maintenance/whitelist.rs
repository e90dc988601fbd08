use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const WHITELIST_MARKER: &str = "let WHITELIST: string[] = [";

#[derive(Debug, Error)]
pub enum WhitelistError {
    #[error("WHITELIST section not found")]
    MissingWhitelist,
    #[error("WHITELIST section has no closing bracket")]
    UnterminatedWhitelist,
    #[error("WHITELIST is declared on a single line")]
    SingleLineWhitelist,
    #[error("failed to read token list: {0}")]
    TokenList(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WhitelistToken {
    pub address: String,
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
struct TokenList {
    #[serde(default)]
    tokens: Vec<WhitelistToken>,
}

pub fn load_tokens(path: &Path) -> Result<Vec<WhitelistToken>, WhitelistError> {
    let content = fs::read_to_string(path)?;
    let list: TokenList = serde_json::from_str(&content)?;
    Ok(list.tokens)
}

/// First `*.json` file in `dir`, by file name.
pub fn find_token_list(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

/// Insert tokens into the WHITELIST array of a pricing source, just before
/// its closing bracket. Addresses already present are skipped.
///
/// Only quoted literals inside the block count as present. An address that
/// appears there only through a constant (`WETH_ADDRESS, // WETH`) is not
/// resolved and will be inserted again as a literal.
///
/// Returns the new source and the number of inserted entries.
pub fn inject_entries(
    source: &str,
    tokens: &[WhitelistToken],
) -> Result<(String, usize), WhitelistError> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();

    let start = lines
        .iter()
        .position(|line| line.contains(WHITELIST_MARKER))
        .ok_or(WhitelistError::MissingWhitelist)?;
    if lines[start].trim().ends_with(']') {
        return Err(WhitelistError::SingleLineWhitelist);
    }

    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim().ends_with(']'))
        .map(|offset| start + 1 + offset)
        .ok_or(WhitelistError::UnterminatedWhitelist)?;

    let existing = lines[start + 1..end].concat().to_lowercase();
    let mut seen = HashSet::new();
    let entries: Vec<String> = tokens
        .iter()
        .map(|token| (token.address.to_lowercase(), token))
        .filter(|(address, _)| !existing.contains(&format!("'{}'", address)))
        .filter(|(address, _)| seen.insert(address.clone()))
        .map(|(address, token)| format!("  '{}', // {}\n", address, token.symbol))
        .collect();

    let mut output = String::with_capacity(source.len() + entries.iter().map(String::len).sum::<usize>());
    // Every line before `end` keeps its '\n' from split_inclusive.
    for line in &lines[..end] {
        output.push_str(line);
    }
    for entry in &entries {
        output.push_str(entry);
    }
    for line in &lines[end..] {
        output.push_str(line);
    }

    Ok((output, entries.len()))
}

/// Merge the token list at `tokens_path` into the pricing file. The file is
/// only rewritten when something was inserted.
pub fn update_pricing_file(tokens_path: &Path, pricing_path: &Path) -> Result<usize, WhitelistError> {
    let tokens = load_tokens(tokens_path)?;
    let source = fs::read_to_string(pricing_path)?;
    let (updated, inserted) = inject_entries(&source, &tokens)?;

    if inserted > 0 {
        fs::write(pricing_path, updated)?;
        log::info!("Updated {} with {} new entries", pricing_path.display(), inserted);
    } else {
        log::info!("{} already contains every token", pricing_path.display());
    }
    Ok(inserted)
}
