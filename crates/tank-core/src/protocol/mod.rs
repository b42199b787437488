//! Wire protocol: telemetry session envelopes, their codec, and the
//! side-channel reply envelope.

pub mod codec;
pub mod messages;
pub mod reply;

pub use codec::{decode_inbound, encode_command, encode_outbound, ProtocolError};
pub use messages::*;
pub use reply::{ReplyEnvelope, ReplyError, CONNECT_STATUSES, DISCONNECT_STATUSES, OK_STATUSES};
