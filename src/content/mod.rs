//! Static content: Louisiana statutes and the rights recitation
//!
//! Everything here is loaded once at startup and never mutated.

mod rights;
mod statutes;

pub use statutes::{LookupError, StatuteEntry, DEFAULT_PREFIXES};

use rights::RIGHTS_SCRIPT;
use statutes::STATUTE_TABLE;

/// Read-only store for statutes and the rights script
#[derive(Debug, Clone)]
pub struct ContentStore {
    statutes: Vec<StatuteEntry>,
    rights: Vec<String>,
    /// Jurisdiction prefixes tried, in order, for bare statute numbers
    prefixes: Vec<String>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect())
    }
}

impl ContentStore {
    /// Build the store from the bundled tables
    pub fn new(prefixes: Vec<String>) -> Self {
        Self {
            statutes: STATUTE_TABLE
                .iter()
                .map(|(code, description)| StatuteEntry::new(*code, *description))
                .collect(),
            rights: RIGHTS_SCRIPT.iter().map(|line| line.to_string()).collect(),
            prefixes,
        }
    }

    /// Look up a statute by code
    ///
    /// An exact match wins. A query without a `:` separator is retried
    /// with each jurisdiction prefix in priority order.
    pub fn lookup_statute(&self, code: &str) -> Result<&StatuteEntry, LookupError> {
        let code = code.trim();

        if let Some(entry) = self.find_exact(code) {
            return Ok(entry);
        }

        if !code.contains(':') {
            for prefix in &self.prefixes {
                let qualified = format!("{prefix}{code}");
                if let Some(entry) = self.find_exact(&qualified) {
                    return Ok(entry);
                }
            }
        }

        Err(LookupError::NotFound(code.to_string()))
    }

    /// Case-insensitive substring search over descriptions, in table order
    pub fn search_statutes(&self, keyword: &str) -> Vec<&StatuteEntry> {
        let keyword = keyword.to_lowercase();
        self.statutes
            .iter()
            .filter(|entry| entry.description.to_lowercase().contains(&keyword))
            .collect()
    }

    /// The rights recitation, one spoken line per entry
    pub fn rights_script(&self) -> &[String] {
        &self.rights
    }

    fn find_exact(&self, code: &str) -> Option<&StatuteEntry> {
        self.statutes.iter().find(|entry| entry.code == code)
    }
}
