use super::seqno::Wrap32;

/// Largest payload carried in a single segment.
pub const MAX_PAYLOAD_SIZE: usize = 1452;

/// Default retransmission timeout before any backoff.
pub const DEFAULT_RTO_MS: u64 = 1000;

/// Default capacity of the inbound and outbound byte streams.
pub const DEFAULT_CAPACITY: usize = 64_000;

/// Knobs for building one endpoint of a connection.
#[derive(Debug, Clone, Copy)]
pub struct TcpConfig {
    pub capacity: usize,
    pub rt_timeout_ms: u64,
    pub isn: Wrap32,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            rt_timeout_ms: DEFAULT_RTO_MS,
            isn: Wrap32::new(0),
        }
    }
}
