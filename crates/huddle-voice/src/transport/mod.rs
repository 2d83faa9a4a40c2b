//! The real-time transport boundary.
//!
//! Media negotiation, codecs and network traversal all happen behind
//! [`TransportHandle`]; the coordinator only issues imperative controls
//! and consumes the typed [`TransportEvent`] stream.

mod adapter;
mod types;

pub use adapter::{TransportFactory, TransportHandle};
pub use types::{
    JoinRequest, JoinedRoom, ScreenShareConstraints, Subscription, TrackKind, TransportError,
    TransportEvent, TransportOptions,
};
