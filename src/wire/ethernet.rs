//! Ethernet framing: a 14-byte header in front of an opaque payload.

use crate::error::ParseError;

pub type EthernetAddress = [u8; 6];

/// Destination address of frames meant for everyone on the segment.
pub const ETHERNET_BROADCAST: EthernetAddress = [0xff; 6];

/// EtherType value for IPv4 payloads.
pub const ETHERTYPE_IPV4: u16 = 0x0800;
/// EtherType value for ARP payloads.
pub const ETHERTYPE_ARP: u16 = 0x0806;

const HEADER_LEN: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: EthernetAddress,
    pub src: EthernetAddress,
    pub ethertype: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub header: EthernetHeader,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < HEADER_LEN {
            return Err(ParseError::Truncated(data.len()));
        }
        let mut dst = [0u8; 6];
        let mut src = [0u8; 6];
        dst.copy_from_slice(&data[0..6]);
        src.copy_from_slice(&data[6..12]);
        let ethertype = u16::from_be_bytes([data[12], data[13]]);
        Ok(Self {
            header: EthernetHeader { dst, src, ethertype },
            payload: data[HEADER_LEN..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&self.header.dst);
        out.extend_from_slice(&self.header.src);
        out.extend_from_slice(&self.header.ethertype.to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_short_input() {
        assert!(matches!(
            EthernetFrame::parse(&[0u8; 13]),
            Err(ParseError::Truncated(13))
        ));
    }

    #[test]
    fn header_layout() {
        let frame = EthernetFrame {
            header: EthernetHeader {
                dst: [1, 2, 3, 4, 5, 6],
                src: [7, 8, 9, 10, 11, 12],
                ethertype: ETHERTYPE_ARP,
            },
            payload: vec![0xaa, 0xbb],
        };
        let bytes = frame.serialize();
        assert_eq!(&bytes[..6], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&bytes[12..14], &[0x08, 0x06]);
        assert_eq!(EthernetFrame::parse(&bytes).unwrap(), frame);
    }
}
