//! Display masking for secrets.
//!
//! Masking only changes how a secret is shown. Storage and validation always
//! use the unmasked value.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::api_key::ApiKey;

/// Number of trailing characters replaced by the mask.
pub const MASK_WIDTH: usize = 5;

/// Character used for masked positions.
pub const MASK_CHAR: char = '*';

/// Replace the last [`MASK_WIDTH`] characters of `secret` with the mask.
///
/// Secrets no longer than the mask render as the bare mask.
pub fn mask_secret(secret: &str) -> String {
    let visible = secret.chars().count().saturating_sub(MASK_WIDTH);
    let mut masked: String = secret.chars().take(visible).collect();
    masked.extend(std::iter::repeat_n(MASK_CHAR, MASK_WIDTH));
    masked
}

/// Per-record reveal state. Every record starts masked.
#[derive(Debug, Clone, Default)]
pub struct RevealSet {
    revealed: HashSet<Uuid>,
}

impl RevealSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_revealed(&self, id: Uuid) -> bool {
        self.revealed.contains(&id)
    }

    /// Flip the reveal state of one record and return the new state.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.revealed.remove(&id) {
            false
        } else {
            self.revealed.insert(id);
            true
        }
    }

    /// The secret of `key` as it should be shown.
    pub fn display(&self, key: &ApiKey) -> String {
        if self.is_revealed(key.id) {
            key.secret.clone()
        } else {
            mask_secret(&key.secret)
        }
    }

    /// Build the state from a comma-separated list of record ids, e.g. from
    /// `?reveal=`. Each listed id toggles its record, starting from all masked.
    ///
    /// Blank entries are skipped.
    pub fn parse(ids: &str) -> Result<Self, uuid::Error> {
        let mut reveal = Self::new();
        for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            reveal.toggle(Uuid::parse_str(id)?);
        }
        Ok(reveal)
    }
}
