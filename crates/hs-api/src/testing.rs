//! Test-only plumbing shared by the handler, chat, and seed tests: one
//! mock per port plus a builder for a fully wired [`AppState`].

use std::path::PathBuf;
use std::sync::Arc;

use hs_core::traits::{
    MockArchiveRepo, MockCredentialGate, MockMediaStore, MockMessageRepo, MockSettingsRepo,
    MockTheoryRepo, MockUserRepo,
};
use hs_core::SalonBus;
use secrecy::SecretString;

use crate::chat::ProgressionLocks;
use crate::policy::Policy;
use crate::state::AppState;

pub(crate) const TEST_FOUNDER: &str = "Excer";
pub(crate) const TEST_FOUNDER_PASSWORD: &str = "Kabus99qwer.";

pub(crate) struct MockSet {
    pub users: MockUserRepo,
    pub messages: MockMessageRepo,
    pub theories: MockTheoryRepo,
    pub archives: MockArchiveRepo,
    pub settings: MockSettingsRepo,
    pub media: MockMediaStore,
    pub gate: MockCredentialGate,
}

impl MockSet {
    pub fn new() -> Self {
        Self {
            users: MockUserRepo::new(),
            messages: MockMessageRepo::new(),
            theories: MockTheoryRepo::new(),
            archives: MockArchiveRepo::new(),
            settings: MockSettingsRepo::new(),
            media: MockMediaStore::new(),
            gate: MockCredentialGate::new(),
        }
    }

    /// Gate behaving like the shipped plaintext adapter.
    pub fn with_plain_gate(mut self) -> Self {
        self.gate.expect_seal().returning(|raw| raw.to_owned());
        self.gate
            .expect_verify()
            .returning(|supplied, sealed| supplied == sealed);
        self
    }

    pub fn into_state(self) -> AppState {
        AppState {
            users: Arc::new(self.users),
            messages: Arc::new(self.messages),
            theories: Arc::new(self.theories),
            archives: Arc::new(self.archives),
            settings: Arc::new(self.settings),
            media: Arc::new(self.media),
            gate: Arc::new(self.gate),
            bus: SalonBus::new(16),
            progression: ProgressionLocks::default(),
            policy: Policy::new(TEST_FOUNDER),
            founder_password: SecretString::from(TEST_FOUNDER_PASSWORD),
            xp_per_message: 10,
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}
