//! Shared state handed to every handler. Ports are trait objects so the
//! binary decides which adapters back them; the rest is small cloneable
//! plumbing.

use std::path::PathBuf;
use std::sync::Arc;

use hs_core::traits::{
    ArchiveRepo, CredentialGate, MediaStore, MessageRepo, SettingsRepo, TheoryRepo, UserRepo,
};
use hs_core::SalonBus;
use secrecy::SecretString;

use crate::chat::ProgressionLocks;
use crate::policy::Policy;

pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub messages: Arc<dyn MessageRepo>,
    pub theories: Arc<dyn TheoryRepo>,
    pub archives: Arc<dyn ArchiveRepo>,
    pub settings: Arc<dyn SettingsRepo>,
    pub media: Arc<dyn MediaStore>,
    pub gate: Arc<dyn CredentialGate>,
    pub bus: SalonBus,
    pub progression: ProgressionLocks,
    pub policy: Policy,
    /// Seed/restore material for the founder account.
    pub founder_password: SecretString,
    pub xp_per_message: i64,
    /// Where uploaded files live on disk; served under `/uploads`.
    pub uploads_dir: PathBuf,
}
