// Recipient source - The ordered wallet list
// Either a JSON array of address strings or plain text with one address per line

use crate::identity::{parse_address, Address, AddressError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecipientsError {
    #[error("Failed to read recipient list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recipient list is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid recipient at {position}: {source}")]
    InvalidAddress {
        /// "entry N" for JSON input, "line N" for text input (1-based)
        position: String,
        #[source]
        source: AddressError,
    },
}

/// Read recipients from `path`
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Address>, RecipientsError> {
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

/// Parse recipients, keeping list order and duplicates
pub fn parse(contents: &str) -> Result<Vec<Address>, RecipientsError> {
    if contents.trim_start().starts_with('[') {
        let raw: Vec<String> = serde_json::from_str(contents)?;
        return raw
            .iter()
            .enumerate()
            .map(|(i, s)| {
                parse_address(s.trim()).map_err(|source| RecipientsError::InvalidAddress {
                    position: format!("entry {}", i + 1),
                    source,
                })
            })
            .collect();
    }

    let mut recipients = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let address = parse_address(line).map_err(|source| RecipientsError::InvalidAddress {
            position: format!("line {}", i + 1),
            source,
        })?;
        recipients.push(address);
    }
    Ok(recipients)
}
