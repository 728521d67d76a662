use std::fmt;

use crate::{ObjectId, Role, SequenceNumber};

/// Bytes occupied on the wire by the kind tag
const KIND_BYTES: usize = 1;
/// Bytes occupied on the wire by the flag byte (reliability and origin role)
const FLAG_BYTES: usize = 1;
/// Bytes occupied on the wire by the sequence field: session epoch and number
const SEQUENCE_BYTES: usize =
    std::mem::size_of::<u64>() + std::mem::size_of::<SequenceNumber>();

/// Tag identifying how a message is routed on receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Connect,
    Disconnect,
    EntityCreate,
    EntityDestroy,
    PropertyUpdate,
    System,
    /// Application-defined message, tagged so several custom channels can coexist
    Custom(u16),
}

impl MessageKind {
    /// Kinds that the dispatch engine handles itself before consulting any
    /// registered handler
    pub fn is_builtin(&self) -> bool {
        !matches!(self, MessageKind::System | MessageKind::Custom(_))
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Connect => write!(f, "Connect"),
            MessageKind::Disconnect => write!(f, "Disconnect"),
            MessageKind::EntityCreate => write!(f, "EntityCreate"),
            MessageKind::EntityDestroy => write!(f, "EntityDestroy"),
            MessageKind::PropertyUpdate => write!(f, "PropertyUpdate"),
            MessageKind::System => write!(f, "System"),
            MessageKind::Custom(tag) => write!(f, "Custom({})", tag),
        }
    }
}

/// Sender-side metadata put on a message when a session queues it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageStamp {
    /// Role of the sending session, `None` until the message is sent
    pub origin: Option<Role>,
    /// Random id of the sending session; changes on every initialize
    pub epoch: u64,
    /// Per-property counter for property updates, per-session otherwise
    pub sequence: SequenceNumber,
    /// Milliseconds since UNIX epoch
    pub sent_at: u64,
}

/// A unit of replication traffic. Immutable once built; the sending session
/// stamps its origin, sequence number and send time on a copy when it is
/// queued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    object_id: ObjectId,
    property_name: String,
    payload: Vec<u8>,
    reliable: bool,
    stamp: MessageStamp,
}

impl Message {
    pub fn new(kind: MessageKind, object_id: ObjectId, payload: Vec<u8>, reliable: bool) -> Self {
        Self {
            kind,
            object_id,
            property_name: String::new(),
            payload,
            reliable,
            stamp: MessageStamp::default(),
        }
    }

    pub fn connect(payload: Vec<u8>) -> Self {
        Self::new(MessageKind::Connect, ObjectId::default(), payload, true)
    }

    pub fn disconnect(reason: &str) -> Self {
        Self::new(
            MessageKind::Disconnect,
            ObjectId::default(),
            reason.as_bytes().to_vec(),
            true,
        )
    }

    pub fn entity_create(object_id: ObjectId) -> Self {
        Self::new(MessageKind::EntityCreate, object_id, Vec::new(), true)
    }

    pub fn entity_destroy(object_id: ObjectId) -> Self {
        Self::new(MessageKind::EntityDestroy, object_id, Vec::new(), true)
    }

    pub fn property_update(
        object_id: ObjectId,
        property_name: &str,
        payload: Vec<u8>,
        reliable: bool,
    ) -> Self {
        Self {
            property_name: property_name.to_string(),
            ..Self::new(MessageKind::PropertyUpdate, object_id, payload, reliable)
        }
    }

    pub fn custom(tag: u16, object_id: ObjectId, payload: Vec<u8>, reliable: bool) -> Self {
        Self::new(MessageKind::Custom(tag), object_id, payload, reliable)
    }

    /// Returns a copy carrying `stamp`
    pub fn stamped(&self, stamp: MessageStamp) -> Self {
        Self {
            stamp,
            ..self.clone()
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn is_reliable(&self) -> bool {
        self.reliable
    }

    pub fn stamp(&self) -> &MessageStamp {
        &self.stamp
    }

    pub fn origin(&self) -> Option<Role> {
        self.stamp.origin
    }

    pub fn sequence(&self) -> SequenceNumber {
        self.stamp.sequence
    }

    /// Milliseconds since UNIX epoch at which the message was queued, 0 if
    /// it has not been sent yet
    pub fn sent_at(&self) -> u64 {
        self.stamp.sent_at
    }

    /// Number of bytes this message accounts for in bandwidth statistics:
    /// the kind tag, object id, property name, payload, flags and sequence.
    pub fn wire_size(&self) -> usize {
        KIND_BYTES
            + self.object_id.as_str().len()
            + self.property_name.len()
            + self.payload.len()
            + FLAG_BYTES
            + SEQUENCE_BYTES
    }
}
