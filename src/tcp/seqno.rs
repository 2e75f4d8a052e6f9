use std::ops::Add;

/// A 32-bit sequence number as it appears on the wire.
///
/// The actual sequence number space is finite: it ranges from 0 to
/// 2^32 - 1 and all arithmetic on it is performed modulo 2^32 (RFC 793
/// section 3.3). Each direction of a connection additionally offsets its
/// numbers by a random initial sequence number, the zero point, so equal
/// wire values on different connections mean different stream positions.
///
/// `wrap` projects a 64-bit absolute stream index down to the wire value;
/// `unwrap` lifts a wire value back to the absolute index closest to a
/// caller-supplied checkpoint, which resolves the ambiguity introduced by
/// wrapping as long as the true value is within 2^31 of the checkpoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Wrap32(u32);

impl Wrap32 {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The wire value for absolute sequence number `n` under `zero_point`.
    pub fn wrap(n: u64, zero_point: Wrap32) -> Wrap32 {
        zero_point + n as u32
    }

    /// The absolute sequence number this wire value stands for, chosen as
    /// the candidate closest to `checkpoint`.
    ///
    /// Candidates are `offset + k * 2^32` for the values of `k` bracketing
    /// the checkpoint's high 32 bits; negative candidates are never
    /// produced, and a tie goes to the smaller value.
    pub fn unwrap(self, zero_point: Wrap32, checkpoint: u64) -> u64 {
        const SPAN: u64 = 1 << 32;
        let offset = self.0.wrapping_sub(zero_point.0) as u64;
        let anchored = (checkpoint & !(SPAN - 1)) + offset;

        let mut best: Option<(u64, u64)> = None;
        for candidate in [
            anchored.checked_sub(SPAN),
            Some(anchored),
            anchored.checked_add(SPAN),
        ]
        .into_iter()
        .flatten()
        {
            let distance = candidate.abs_diff(checkpoint);
            // strict comparison over ascending candidates: ties keep the
            // smaller value
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((candidate, distance));
            }
        }
        best.map(|(value, _)| value).unwrap_or(anchored)
    }
}

impl Add<u32> for Wrap32 {
    type Output = Wrap32;

    fn add(self, rhs: u32) -> Wrap32 {
        Wrap32(self.0.wrapping_add(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_offsets_from_zero_point() {
        assert_eq!(Wrap32::wrap(3, Wrap32::new(0)), Wrap32::new(3));
        assert_eq!(Wrap32::wrap(3, Wrap32::new(u32::MAX - 1)), Wrap32::new(1));
        assert_eq!(
            Wrap32::wrap(1 << 32, Wrap32::new(47)),
            Wrap32::new(47),
        );
        assert_eq!(
            Wrap32::wrap((1 << 33) + 13, Wrap32::new(47)),
            Wrap32::new(60),
        );
    }

    #[test]
    fn unwrap_near_zero_point() {
        let zero = Wrap32::new(u32::MAX - 1);
        let wrapped = Wrap32::wrap(3, zero);
        assert_eq!(wrapped, Wrap32::new(1));
        assert_eq!(wrapped.unwrap(zero, 0), 3);
    }

    #[test]
    fn unwrap_follows_checkpoint() {
        let zero = Wrap32::new(0);
        let seqno = Wrap32::new(17);
        assert_eq!(seqno.unwrap(zero, 0), 17);
        assert_eq!(seqno.unwrap(zero, 1 << 32), 17 + (1u64 << 32));
        assert_eq!(seqno.unwrap(zero, 5 << 32), 17 + (5u64 << 32));
    }

    #[test]
    fn unwrap_never_goes_negative() {
        let zero = Wrap32::new(10);
        // offset is large, checkpoint is small: the only candidate below
        // would be negative, so the non-negative one wins
        let seqno = Wrap32::new(9);
        assert_eq!(seqno.unwrap(zero, 0), u32::MAX as u64);
    }

    #[test]
    fn unwrap_tie_prefers_smaller() {
        let zero = Wrap32::new(0);
        let seqno = Wrap32::new(0);
        // checkpoint exactly between candidates 0 and 2^32
        assert_eq!(seqno.unwrap(zero, 1 << 31), 0);
        // and between 2^32 and 2^33
        assert_eq!(seqno.unwrap(zero, 3 << 31), 1 << 32);
    }

    #[test]
    fn roundtrip_within_half_space() {
        let zero = Wrap32::new(0xdead_beef);
        for &(n, checkpoint) in &[
            (0u64, 0u64),
            (1, 0),
            (u32::MAX as u64, u32::MAX as u64),
            ((1 << 32) + 5, 1 << 32),
            ((1 << 40) + 17, (1 << 40) - 100),
            (u64::MAX / 2, u64::MAX / 2 + 1000),
        ] {
            assert_eq!(Wrap32::wrap(n, zero).unwrap(zero, checkpoint), n);
        }
    }
}
