//! Cross-widget messaging between the tag input and a sibling tag list.
//!
//! A namespace bus is an explicit pair of endpoints over two unbounded
//! channels, one per direction, created together and scoped to the two
//! cooperating widgets. Every publish carries a full snapshot of the
//! collection, never a delta, so a late-joining consumer only needs the most
//! recent message.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::lookup::Tag;

/// A message on a namespace channel.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    /// Full snapshot of the collection, published on mount and after every
    /// mutation.
    TagsChanged {
        /// The complete tag list.
        tags: Vec<Tag>,
    },
    /// Ask the owning widget to remove the tag at `index`.
    RemoveTag {
        /// Index into the owner's collection.
        index: usize,
    },
    /// Ask the owning widget to re-publish its current snapshot. Sent by
    /// late-mounting views to request an initial sync.
    GetTags,
}

/// One end of a namespace bus.
#[derive(Debug)]
pub struct BusEndpoint {
    namespace: String,
    tx: UnboundedSender<BusMessage>,
    rx: UnboundedReceiver<BusMessage>,
}

impl BusEndpoint {
    /// The namespace this endpoint belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Send a message to the peer. Returns false if the peer is gone.
    pub fn send(&self, message: BusMessage) -> bool {
        if self.tx.send(message).is_err() {
            tracing::debug!(namespace = %self.namespace, "bus peer disconnected");
            return false;
        }
        true
    }

    /// Publish a full snapshot of the collection.
    pub fn publish_tags(&self, tags: &[Tag]) -> bool {
        self.send(BusMessage::TagsChanged {
            tags: tags.to_vec(),
        })
    }

    /// Receive the next pending message, if any.
    pub fn try_recv(&mut self) -> Option<BusMessage> {
        self.rx.try_recv().ok()
    }
}

/// Create the two endpoints of a namespace bus.
///
/// The first endpoint goes to the tag input (the collection owner), the
/// second to the mirroring tag list view.
pub fn pair(namespace: impl Into<String>) -> (BusEndpoint, BusEndpoint) {
    let namespace = namespace.into();
    let (widget_tx, list_rx) = mpsc::unbounded_channel();
    let (list_tx, widget_rx) = mpsc::unbounded_channel();

    (
        BusEndpoint {
            namespace: namespace.clone(),
            tx: widget_tx,
            rx: widget_rx,
        },
        BusEndpoint {
            namespace,
            tx: list_tx,
            rx: list_rx,
        },
    )
}
