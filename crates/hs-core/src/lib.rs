//! hemsaye/crates/hs-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Hemsaye:
//! entities, the error taxonomy, the storage/media/credential ports, and
//! the Progression & Presence Sync core (rank ladder, progression engine,
//! salon broadcast bus).

pub mod bus;
pub mod error;
pub mod ladder;
pub mod models;
pub mod progression;
pub mod traits;

// Re-exporting for easier access in other crates
pub use bus::{SalonBus, SalonEvent, MAIN_SALON};
pub use error::{AppError, Result};
pub use ladder::{DuplicateRank, RankLadder, AVAILABLE_RANKS_KEY, EXEMPT_RANK};
pub use models::*;
pub use progression::{advance, Advancement};
pub use traits::*;
