//! Transports moving message text between the client and a backend.
//!
//! The client only needs [`Transport::send`]. Inbound text is delivered by
//! whoever owns the read side, either directly through
//! [`DispatchClient::on_message`](crate::DispatchClient::on_message) or via an
//! [`InboundQueue`] when reading happens on another thread.

mod framing;
mod queue;

pub use framing::{FrameReader, FramedWriter, MAX_FRAME_LEN};
pub use queue::{InboundQueue, InboundSender};

use crate::error::TransportError;

/// Outbound half of a message channel.
pub trait Transport {
    /// Delivers one complete message.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the message could not be written.
    fn send(&mut self, message: &str) -> Result<(), TransportError>;
}
