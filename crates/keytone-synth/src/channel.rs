//! Control → render parameter channel.
//!
//! An append-then-drain queue. The control side sends whole [`ParamMessage`]
//! values (each one is moved across as a unit, so the render side never sees a
//! half-written message). The render side drains everything queued since the
//! previous block before it generates samples.

use crate::message::ParamMessage;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Errors from the control side of the parameter channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The render side was dropped; nothing will consume the message.
    #[error("parameter channel disconnected: render side is gone")]
    Disconnected,
}

/// Create a connected sender/receiver pair.
pub fn param_channel() -> (ParamSender, ParamReceiver) {
    let (tx, rx) = unbounded();
    (ParamSender { tx }, ParamReceiver { rx })
}

/// Control-side handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ParamSender {
    tx: Sender<ParamMessage>,
}

impl ParamSender {
    /// Enqueue a message.
    ///
    /// The message is sanitized first (see [`ParamMessage::sanitized`]); if
    /// nothing survives, nothing is sent.
    pub fn send(&self, msg: ParamMessage) -> Result<(), ChannelError> {
        let clean = msg.sanitized();

        #[cfg(feature = "tracing")]
        {
            if msg.frequency.is_some() && clean.frequency.is_none() {
                tracing::warn!(frequency = ?msg.frequency, "dropping non-finite frequency");
            }
            if msg.duty.is_some() && clean.duty.is_none() {
                tracing::warn!(duty = ?msg.duty, "dropping non-finite duty ratio");
            }
        }

        if clean.is_empty() {
            return Ok(());
        }
        self.tx.send(clean).map_err(|_| ChannelError::Disconnected)
    }
}

/// Render-side handle.
#[derive(Debug)]
pub struct ParamReceiver {
    rx: Receiver<ParamMessage>,
}

impl ParamReceiver {
    /// Apply every message queued at the time of the call, in arrival order.
    ///
    /// Messages that arrive while draining wait for the next call, so the
    /// amount of work is bounded by the queue length at entry. Never blocks.
    /// Returns the number of messages applied.
    pub fn drain<F>(&self, mut apply: F) -> usize
    where
        F: FnMut(&ParamMessage),
    {
        let pending = self.rx.len();
        let mut applied = 0;
        while applied < pending {
            match self.rx.try_recv() {
                Ok(msg) => {
                    apply(&msg);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Number of messages waiting.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
