//! # Progression Engine
//!
//! Pure xp/rank arithmetic. Takes the current user state, an xp delta and a
//! ladder snapshot, and returns the state a store should persist. No I/O
//! happens here; the gateway owns locking and persistence.

use crate::ladder::RankLadder;
use crate::models::User;

/// Promotion thresholds: hold at least this much xp to qualify for the rank
/// at the paired ladder index. Ascending, so the last satisfied entry wins.
const THRESHOLDS: [(i64, usize); 4] = [(100, 1), (500, 2), (2000, 3), (5000, 4)];

/// The xp/rank pair a store should persist after a progression step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advancement {
    pub xp: i64,
    pub rank: String,
}

/// Applies an xp delta and resolves the resulting rank.
///
/// Xp accrues for everyone, exempt ranks included; only the rank of an
/// exempt holder is frozen. A rank name that is not on the ladder counts
/// as below every tier, so the holder re-enters the ladder at whatever
/// tier their xp now satisfies. Thresholds pointing past the end of a
/// shortened ladder are skipped.
pub fn advance(user: &User, delta: i64, ladder: &RankLadder) -> Advancement {
    let xp = user.xp + delta;

    if ladder.is_exempt(&user.rank) {
        return Advancement {
            xp,
            rank: user.rank.clone(),
        };
    }

    let tier = ladder.index_of(&user.rank);

    let mut rank = user.rank.clone();
    for (needed, candidate) in THRESHOLDS {
        if xp < needed {
            break;
        }
        // Promotion only ever moves up from the pre-delta tier.
        if tier.map_or(true, |t| t < candidate) {
            if let Some(name) = ladder.rank_at(candidate) {
                rank = name.to_owned();
            }
        }
    }

    Advancement { xp, rank }
}
