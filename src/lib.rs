//! User-space data plane of a TCP/IP stack: a bounded byte stream, an
//! out-of-order reassembler, a TCP sender/receiver pair with wrapping
//! sequence arithmetic, an IPv4-over-Ethernet interface with ARP, and a
//! longest-prefix-match router tying interfaces together.
//!
//! Everything is single-threaded and synchronous. Callers own the clock
//! and drive timeouts through the `tick` methods; callers also own the
//! wiring, moving frames between ports and feeding acks back to senders.

#![forbid(unsafe_code)]

pub mod error;
pub mod iface;
pub mod reassembler;
pub mod router;
pub mod stream;
pub mod tcp;
pub mod wire;

pub use error::ParseError;
pub use iface::{FrameSink, NetworkInterface};
pub use reassembler::Reassembler;
pub use router::Router;
pub use stream::ByteStream;
pub use tcp::config::TcpConfig;
pub use tcp::message::{TcpReceiverMessage, TcpSenderMessage};
pub use tcp::receiver::TcpReceiver;
pub use tcp::sender::TcpSender;
pub use tcp::seqno::Wrap32;
