use crate::reassembler::Reassembler;
use crate::stream::ByteStream;

use super::message::{TcpReceiverMessage, TcpSenderMessage};
use super::seqno::Wrap32;

/// The receiving half of a connection: unwraps peer seqnos into stream
/// indices, feeds the reassembler, and generates ackno/window messages.
///
/// Sequence number 0 of the peer's sequence space is its SYN, so stream
/// index `i` lives at sequence number `i + 1`; the FIN occupies the slot
/// after the last payload byte.
#[derive(Debug)]
pub struct TcpReceiver {
    reassembler: Reassembler,
    zero_point: Wrap32,
    syn_received: bool,
}

impl TcpReceiver {
    pub fn new(reassembler: Reassembler) -> Self {
        Self {
            reassembler,
            zero_point: Wrap32::new(0),
            syn_received: false,
        }
    }

    pub fn receive(&mut self, mut message: TcpSenderMessage) {
        if message.syn && !self.syn_received {
            self.zero_point = message.seqno;
            // the SYN itself occupies the seqno; payload starts one later
            message.seqno = message.seqno + 1;
            self.syn_received = true;
        }

        if message.rst {
            self.reassembler.set_error();
        }

        if !self.syn_received {
            return;
        }

        // A payload seqno equal to the zero point would claim the SYN's
        // slot; such bytes have no stream index and are dropped.
        if message.seqno == self.zero_point {
            return;
        }

        let checkpoint = self.reassembler.output().bytes_pushed();
        let first_index = message.seqno.unwrap(self.zero_point, checkpoint) - 1;
        self.reassembler
            .insert(first_index, &message.payload, message.fin);
    }

    pub fn send(&self) -> TcpReceiverMessage {
        let ackno = self.syn_received.then(|| {
            // next needed seqno: pushed bytes plus the SYN, plus the FIN
            // once the stream is closed
            let mut next = self.reassembler.output().bytes_pushed() + 1;
            if self.reassembler.output().is_closed() {
                next += 1;
            }
            Wrap32::wrap(next, self.zero_point)
        });
        let window_size = self
            .reassembler
            .output()
            .available_capacity()
            .min(u16::MAX as usize) as u16;
        TcpReceiverMessage {
            ackno,
            window_size,
            rst: self.reassembler.has_error(),
        }
    }

    pub fn output(&self) -> &ByteStream {
        self.reassembler.output()
    }

    pub fn output_mut(&mut self) -> &mut ByteStream {
        self.reassembler.output_mut()
    }

    pub fn bytes_pending(&self) -> u64 {
        self.reassembler.bytes_pending()
    }
}
