//! Single-consumer queue feeding inbound text to the client's thread.
//!
//! A reader thread pushes each frame into an `mpsc` channel. The thread that
//! owns the [`DispatchClient`] drains the channel, so message handling never
//! runs concurrently.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use super::Transport;
use super::framing::FrameReader;
use crate::client::DispatchClient;
use crate::error::TransportError;

/// Tracing target for the inbound queue.
const QUEUE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::queue");

/// Producer half of an [`InboundQueue`].
pub type InboundSender = Sender<Result<String, TransportError>>;

/// Consumer half of the inbound channel.
#[derive(Debug)]
pub struct InboundQueue {
    receiver: Receiver<Result<String, TransportError>>,
    failed: Option<TransportError>,
}

impl InboundQueue {
    /// Creates a queue and the sender that feeds it.
    #[must_use]
    pub fn channel() -> (InboundSender, Self) {
        let (sender, receiver) = mpsc::channel();
        (
            sender,
            Self {
                receiver,
                failed: None,
            },
        )
    }

    /// Starts a thread reading frames from `reader` into a new queue.
    ///
    /// The thread stops at end of stream, after forwarding a read error, or
    /// once the queue is dropped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn spawn<R>(mut reader: FrameReader<R>) -> io::Result<(Self, JoinHandle<()>)>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, queue) = Self::channel();
        let handle = thread::Builder::new()
            .name("inspector-reader".to_owned())
            .spawn(move || {
                loop {
                    match reader.receive() {
                        Ok(Some(text)) => {
                            if sender.send(Ok(text)).is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(error) => {
                            if sender.send(Err(error)).is_err() {
                                debug!(target: QUEUE_TARGET, "queue dropped before read error");
                            }
                            break;
                        }
                    }
                }
                debug!(target: QUEUE_TARGET, "reader thread finished");
            })?;
        Ok((queue, handle))
    }

    /// Delivers every message already queued without blocking.
    ///
    /// Returns the number of messages handed to the client. Messages the
    /// client rejects are reported by the client and still counted. A reader
    /// error met after some deliveries is held back and returned by the next
    /// call, so the count is never lost.
    ///
    /// # Errors
    ///
    /// Returns the reader's [`TransportError`] if it failed, and
    /// [`TransportError::Closed`] once the reader is gone and the queue is
    /// empty.
    pub fn pump<T: Transport>(
        &mut self,
        client: &mut DispatchClient<T>,
    ) -> Result<usize, TransportError> {
        if let Some(error) = self.failed.take() {
            return Err(error);
        }
        let mut delivered = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(Ok(text)) => {
                    hand_over(client, &text);
                    delivered += 1;
                }
                Ok(Err(error)) => {
                    if delivered == 0 {
                        return Err(error);
                    }
                    self.failed = Some(error);
                    return Ok(delivered);
                }
                Err(TryRecvError::Empty) => return Ok(delivered),
                Err(TryRecvError::Disconnected) => {
                    if delivered > 0 {
                        return Ok(delivered);
                    }
                    return Err(TransportError::Closed);
                }
            }
        }
    }

    /// Blocks for at most `timeout` and delivers one message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] if nothing arrived,
    /// [`TransportError::Closed`] if the reader is gone, or the reader's own
    /// error.
    pub fn deliver_next<T: Transport>(
        &mut self,
        client: &mut DispatchClient<T>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        if let Some(error) = self.failed.take() {
            return Err(error);
        }
        let text = match self.receiver.recv_timeout(timeout) {
            Ok(frame) => frame?,
            Err(RecvTimeoutError::Timeout) => return Err(TransportError::Timeout { timeout }),
            Err(RecvTimeoutError::Disconnected) => return Err(TransportError::Closed),
        };
        hand_over(client, &text);
        Ok(())
    }
}

fn hand_over<T: Transport>(client: &mut DispatchClient<T>, text: &str) {
    if let Err(error) = client.on_message(text) {
        debug!(target: QUEUE_TARGET, %error, "client rejected inbound message");
    }
}
