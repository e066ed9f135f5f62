//! # Salon Bus
//!
//! In-process fan-out for live salon events. One broadcast channel covers
//! the single salon; publishing never blocks and never fails, and a
//! receiver that falls behind gets [`tokio::sync::broadcast::error::RecvError::Lagged`]
//! and is expected to re-fetch over REST.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::{Message, User};

/// The only salon. Clients name it when joining; everything fans out here.
pub const MAIN_SALON: &str = "ana_salon";

/// Events fanned out to live salon subscribers. Serialized adjacently
/// tagged so the socket layer can forward variants verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SalonEvent {
    MessageReceived(Message),
    UserUpdated(User),
    UserRemoved(String),
    MessagesCleared,
}

/// Cloneable handle on the salon's broadcast channel.
#[derive(Debug, Clone)]
pub struct SalonBus {
    tx: broadcast::Sender<SalonEvent>,
}

impl SalonBus {
    /// `capacity` bounds how far a subscriber may lag before it is dropped
    /// into the lagged path.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire-and-forget publish. Returns how many subscribers were reached;
    /// zero subscribers is a normal quiet-server state, not an error.
    pub fn publish(&self, event: SalonEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SalonEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
