use std::collections::VecDeque;

use crate::stream::ByteStream;

use super::config::MAX_PAYLOAD_SIZE;
use super::message::{TcpReceiverMessage, TcpSenderMessage};
use super::seqno::Wrap32;

/// Countdown until the oldest outstanding segment is retransmitted.
///
/// The timer only has meaning while segments are in flight: callers start
/// it when something is sent, rebuild it on every new acknowledgment, and
/// treat an empty outstanding queue as "not running".
#[derive(Debug)]
struct RetransmissionTimer {
    running: bool,
    remaining_ms: u64,
}

impl RetransmissionTimer {
    fn new(rto_ms: u64) -> Self {
        Self {
            running: false,
            remaining_ms: rto_ms,
        }
    }

    fn start(&mut self, rto_ms: u64) {
        self.running = true;
        self.remaining_ms = rto_ms;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn advance(&mut self, ms: u64) {
        self.remaining_ms = self.remaining_ms.saturating_sub(ms);
    }

    fn expired(&self) -> bool {
        self.remaining_ms == 0
    }

    fn rearm(&mut self, rto_ms: u64) {
        self.remaining_ms = rto_ms;
    }
}

/// The sending half of a connection: reads from the outbound stream,
/// packs segments under the peer's advertised window, and retransmits the
/// oldest unacknowledged segment with exponential backoff.
#[derive(Debug)]
pub struct TcpSender {
    input: ByteStream,
    isn: Wrap32,
    /// Next absolute sequence number to emit; also the unwrap checkpoint.
    next_abs_seqno: u64,
    initial_rto_ms: u64,
    rto_ms: u64,
    in_flight: u64,
    outstanding: VecDeque<TcpSenderMessage>,
    consecutive_retransmissions: u64,
    /// Window as the peer advertised it; may be zero.
    receiver_window: u16,
    /// Effective window: floor of one so a zero window still gets probed.
    window: u64,
    timer: RetransmissionTimer,
    syn_sent: bool,
    fin_sent: bool,
    /// Largest absolute ackno seen so far.
    acked_abs_seqno: u64,
}

impl TcpSender {
    pub fn new(input: ByteStream, isn: Wrap32, initial_rto_ms: u64) -> Self {
        Self {
            input,
            isn,
            next_abs_seqno: 0,
            initial_rto_ms,
            rto_ms: initial_rto_ms,
            in_flight: 0,
            outstanding: VecDeque::new(),
            consecutive_retransmissions: 0,
            receiver_window: 1,
            window: 1,
            timer: RetransmissionTimer::new(initial_rto_ms),
            syn_sent: false,
            fin_sent: false,
            acked_abs_seqno: 0,
        }
    }

    /// Emit as many segments as the window allows, reading payload from
    /// the outbound stream. SYN rides the first segment ever sent; FIN
    /// rides the first segment after the stream finishes, provided it
    /// fits the window.
    pub fn push(&mut self, mut transmit: impl FnMut(&TcpSenderMessage)) {
        while self.in_flight < self.window {
            let mut msg = TcpSenderMessage {
                seqno: Wrap32::wrap(self.next_abs_seqno, self.isn),
                ..Default::default()
            };
            if !self.syn_sent {
                msg.syn = true;
                self.syn_sent = true;
            }

            // the SYN consumes one slot of the window before any payload
            let budget = (self.window - self.in_flight - msg.syn as u64) as usize;
            let payload_len = MAX_PAYLOAD_SIZE
                .min(budget)
                .min(self.input.bytes_buffered());
            msg.payload = self.input.read(payload_len);

            if self.input.is_finished()
                && !self.fin_sent
                && self.in_flight + msg.sequence_length() < self.window
            {
                msg.fin = true;
                self.fin_sent = true;
            }

            if msg.sequence_length() == 0 {
                break;
            }

            self.next_abs_seqno += msg.sequence_length();
            self.in_flight += msg.sequence_length();

            if !self.timer.is_running() {
                self.timer.start(self.rto_ms);
            }

            msg.rst = self.input.has_error();
            transmit(&msg);
            self.outstanding.push_back(msg);
        }
    }

    /// A seqno-bearing message with nothing in it, used for acking and
    /// probing without occupying sequence space.
    pub fn make_empty_message(&self) -> TcpSenderMessage {
        TcpSenderMessage {
            seqno: Wrap32::wrap(self.next_abs_seqno, self.isn),
            rst: self.input.has_error(),
            ..Default::default()
        }
    }

    /// Process the peer's ackno and window. Acks that carry no new data,
    /// or that claim data never sent, are ignored and leave the timer
    /// untouched.
    pub fn receive(&mut self, msg: &TcpReceiverMessage) {
        self.receiver_window = msg.window_size;
        self.window = if msg.window_size == 0 {
            1
        } else {
            msg.window_size as u64
        };

        if msg.rst {
            self.input.set_error();
        }

        let Some(ackno) = msg.ackno else {
            return;
        };
        let acked = ackno.unwrap(self.isn, self.next_abs_seqno);
        if acked <= self.acked_abs_seqno || acked > self.next_abs_seqno {
            return;
        }
        self.acked_abs_seqno = acked;

        while let Some(head) = self.outstanding.front() {
            let head_end =
                head.seqno.unwrap(self.isn, self.next_abs_seqno) + head.sequence_length();
            if head_end > acked {
                break;
            }
            self.in_flight -= head.sequence_length();
            self.outstanding.pop_front();
        }

        // new data acknowledged: RTO and timer start over
        self.rto_ms = self.initial_rto_ms;
        self.timer = RetransmissionTimer::new(self.rto_ms);
        if !self.outstanding.is_empty() {
            self.timer.start(self.rto_ms);
        }
        self.consecutive_retransmissions = 0;
    }

    /// Advance the retransmission timer by `ms_since_last_tick`
    /// milliseconds. On expiry the oldest outstanding segment is sent
    /// again and, unless the peer advertised a zero window, the RTO
    /// doubles.
    pub fn tick(&mut self, ms_since_last_tick: u64, mut transmit: impl FnMut(&TcpSenderMessage)) {
        if !self.timer.is_running() || self.outstanding.is_empty() {
            return;
        }
        self.timer.advance(ms_since_last_tick);
        if !self.timer.expired() {
            return;
        }

        if let Some(head) = self.outstanding.front() {
            transmit(head);
        }
        if self.receiver_window > 0 {
            self.consecutive_retransmissions += 1;
            self.rto_ms *= 2;
        }
        self.timer.rearm(self.rto_ms);
    }

    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.in_flight
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retransmissions
    }

    pub fn input(&self) -> &ByteStream {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut ByteStream {
        &mut self.input
    }

    pub fn has_error(&self) -> bool {
        self.input.has_error()
    }

    pub fn set_error(&mut self) {
        self.input.set_error();
    }
}
