//! # Rank Ladder
//!
//! Ordered list of rank names, index = seniority. The ladder is stored as a
//! plain JSON array under the [`AVAILABLE_RANKS_KEY`] setting and seeded
//! lazily on first read.

use once_cell::sync::Lazy;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::error::AppError;
use crate::traits::SettingsRepo;

/// Settings key the ladder is persisted under.
pub const AVAILABLE_RANKS_KEY: &str = "availableRanks";

/// Terminal rank; holders are frozen out of rank progression and carry the
/// administrative capabilities.
pub const EXEMPT_RANK: &str = "Admin";

static DEFAULT_RANKS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Aday",
        "Üye",
        "Part Lead",
        "General Party Lead",
        "Üstün",
        "Admin",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
});

/// Appending a rank name that is already on the ladder.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Bu rütbe zaten mevcut.")]
pub struct DuplicateRank(pub String);

impl From<DuplicateRank> for AppError {
    fn from(err: DuplicateRank) -> Self {
        AppError::Conflict(err.to_string())
    }
}

/// The ordered rank list. Cheap to clone; loaded fresh per progression so
/// ladder edits apply to the next message without a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankLadder {
    ranks: Vec<String>,
}

impl Default for RankLadder {
    fn default() -> Self {
        Self {
            ranks: DEFAULT_RANKS.clone(),
        }
    }
}

impl RankLadder {
    pub fn new(ranks: Vec<String>) -> Self {
        Self { ranks }
    }

    /// Lowest rank first.
    pub fn ranks_in_order(&self) -> &[String] {
        &self.ranks
    }

    /// Position of a rank name, or None for names not on the ladder.
    pub fn index_of(&self, rank: &str) -> Option<usize> {
        self.ranks.iter().position(|r| r == rank)
    }

    pub fn rank_at(&self, index: usize) -> Option<&str> {
        self.ranks.get(index).map(String::as_str)
    }

    /// Exempt ranks sit outside progression entirely.
    pub fn is_exempt(&self, rank: &str) -> bool {
        rank == EXEMPT_RANK
    }

    /// Appends a new top rank. Names are unique across the ladder.
    pub fn append(&mut self, rank: String) -> Result<(), DuplicateRank> {
        if self.ranks.iter().any(|r| r == &rank) {
            return Err(DuplicateRank(rank));
        }
        self.ranks.push(rank);
        Ok(())
    }

    /// Monotonic counter clients can cheaply compare; appends only, so the
    /// length serves as the version.
    pub fn version(&self) -> usize {
        self.ranks.len()
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.ranks.clone())
    }

    /// Reads the ladder from settings, seeding the default on first access
    /// or when the stored value is not a string array.
    pub async fn load_or_seed(settings: &dyn SettingsRepo) -> anyhow::Result<Self> {
        if let Some(value) = settings.get(AVAILABLE_RANKS_KEY).await? {
            if let Some(ranks) = as_string_array(&value) {
                return Ok(Self::new(ranks));
            }
        }
        let ladder = Self::default();
        settings.put(AVAILABLE_RANKS_KEY, &ladder.to_value()).await?;
        info!(ranks = ladder.ranks.len(), "seeded default rank ladder");
        Ok(ladder)
    }
}

fn as_string_array(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect()
}
