use super::seqno::Wrap32;

/// What one side's sender tells the peer's receiver: where the payload
/// sits in sequence space, plus the SYN/FIN/RST control bits.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TcpSenderMessage {
    pub seqno: Wrap32,
    pub syn: bool,
    pub payload: Vec<u8>,
    pub fin: bool,
    pub rst: bool,
}

impl TcpSenderMessage {
    /// How many sequence numbers this message occupies. SYN and FIN each
    /// take one, payload bytes one each.
    pub fn sequence_length(&self) -> u64 {
        self.syn as u64 + self.payload.len() as u64 + self.fin as u64
    }
}

/// What one side's receiver tells the peer's sender: the cumulative ackno
/// (absent before the handshake), the advertised window, and RST.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TcpReceiverMessage {
    pub ackno: Option<Wrap32>,
    pub window_size: u16,
    pub rst: bool,
}
