//! # hs-auth-simple
//!
//! Plaintext implementation of `CredentialGate`, byte-for-byte compatible
//! with the credential rows the community has accumulated. `seal` is the
//! identity function, so a future hashing gate can re-seal rows on login
//! without a migration step.

use hs_core::traits::CredentialGate;

pub struct PlainCredentialGate;

impl CredentialGate for PlainCredentialGate {
    fn seal(&self, raw: &str) -> String {
        raw.to_owned()
    }

    fn verify(&self, supplied: &str, sealed: &str) -> bool {
        supplied == sealed
    }
}
