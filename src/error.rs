use thiserror::Error;

/// Failures while decoding wire input.
///
/// The data path treats every one of these as "drop the input": they are
/// reported to the immediate caller and never cross the API boundary of the
/// stack.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("buffer too short: {0} bytes")]
    Truncated(usize),

    #[error("invalid IPv4 header: {0}")]
    Ipv4(String),

    #[error("unsupported ARP hardware or protocol type")]
    UnsupportedArp,
}
