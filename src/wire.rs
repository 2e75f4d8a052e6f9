//! Codecs for the frame and datagram formats crossing the wire. The rest
//! of the stack treats these as opaque: parse on the way in, serialize on
//! the way out.

pub mod arp;
pub mod ethernet;
pub mod ipv4;
