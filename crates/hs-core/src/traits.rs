//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Every record mutation round-trips through a port before it is
//! broadcast, so a bus event always describes committed state.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::models::{
    Archive, Message, NewArchive, NewMessage, NewTheory, NewUser, Reply, Theory, User,
};

/// Record-store contract for user rows.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find(&self, nickname: &str) -> anyhow::Result<Option<User>>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;

    /// Full-row update keyed by nickname; returns the stored row, or None
    /// when no such user exists.
    async fn save(&self, user: &User) -> anyhow::Result<Option<User>>;

    /// Single-statement xp/rank write used on the chat path. Callers are
    /// expected to hold the per-nickname progression lock.
    async fn update_progress(
        &self,
        nickname: &str,
        xp: i64,
        rank: &str,
    ) -> anyhow::Result<Option<User>>;

    async fn delete(&self, nickname: &str) -> anyhow::Result<bool>;
}

/// Record-store contract for salon messages.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn append(&self, message: NewMessage) -> anyhow::Result<Message>;

    /// All messages in creation order (ascending id).
    async fn list(&self) -> anyhow::Result<Vec<Message>>;

    /// Bulk delete; returns the number of rows removed.
    async fn clear(&self) -> anyhow::Result<u64>;

    async fn count(&self) -> anyhow::Result<i64>;
}

/// Record-store contract for the theories board.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait TheoryRepo: Send + Sync {
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Theory>>;
    async fn create(&self, theory: NewTheory) -> anyhow::Result<Theory>;
    async fn like(&self, id: i64) -> anyhow::Result<Option<Theory>>;

    /// Appends a reply and keeps the denormalized counter equal to the
    /// reply list's length.
    async fn add_reply(&self, id: i64, reply: Reply) -> anyhow::Result<Option<Theory>>;
}

/// Record-store contract for the image archive.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ArchiveRepo: Send + Sync {
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Archive>>;
    async fn create(&self, archive: NewArchive) -> anyhow::Result<Archive>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

/// Process-wide key/value settings. The rank ladder lives under
/// [`crate::ladder::AVAILABLE_RANKS_KEY`]; nothing else is seeded today.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn put(&self, key: &str, value: &Value) -> anyhow::Result<()>;
}

/// Blob-store contract for uploaded images.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persists raw bytes and returns the public URI they are served from.
    /// `original_name` is only consulted for its extension.
    async fn save_upload(&self, data: Bytes, original_name: &str) -> anyhow::Result<String>;
}

/// Credential-check capability. The shipped adapter compares plaintext for
/// equality, matching observed behavior; the seam exists so a hashing
/// adapter can replace it without touching core or gateway code.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait CredentialGate: Send + Sync {
    /// Prepares a raw credential for storage.
    fn seal(&self, raw: &str) -> String;
    /// Compares a supplied credential against a stored one.
    fn verify(&self, supplied: &str, sealed: &str) -> bool;
}
