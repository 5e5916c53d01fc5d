//! Constant payload shared by every worker

use tokio_tungstenite::tungstenite::Message;

/// Filler byte used for the payload content
pub const FILLER: char = '0';

/// The text frame every worker sends on every tick.
///
/// Built once per run. Cloning shares the underlying buffer, so a send costs a
/// reference-count bump rather than an allocation, and every worker sends
/// byte-identical content.
#[derive(Debug, Clone)]
pub struct Payload {
    message: Message,
    len: usize,
}

impl Payload {
    /// Build a payload of `len` filler bytes
    pub fn filler(len: usize) -> Self {
        let text: String = std::iter::repeat(FILLER).take(len).collect();
        Self {
            message: Message::text(text),
            len,
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Frame to put on the wire for one tick
    pub fn to_message(&self) -> Message {
        self.message.clone()
    }
}
