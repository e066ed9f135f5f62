//! Authorization decisions for the admin surface. Identity literals stay
//! out of the core crates; the founder nickname arrives here from
//! configuration and everything else keys off stored ranks.

use hs_core::ladder::EXEMPT_RANK;
use hs_core::models::User;

#[derive(Debug, Clone)]
pub struct Policy {
    founder: String,
}

impl Policy {
    pub fn new(founder: impl Into<String>) -> Self {
        Self {
            founder: founder.into(),
        }
    }

    pub fn founder(&self) -> &str {
        &self.founder
    }

    pub fn is_founder(&self, nickname: &str) -> bool {
        nickname == self.founder
    }

    /// Only the founder may extend the rank ladder.
    pub fn may_mint_ranks(&self, nickname: &str) -> bool {
        self.is_founder(nickname)
    }

    /// The founder account can never be removed.
    pub fn is_protected(&self, nickname: &str) -> bool {
        self.is_founder(nickname)
    }

    /// Member removal requires the top rank.
    pub fn may_remove_members(&self, actor: &User) -> bool {
        actor.rank == EXEMPT_RANK
    }
}
