//! IPv4 datagrams as an owned header/payload pair, backed by etherparse
//! for header encoding and checksumming.

use std::net::Ipv4Addr;

use etherparse::{IpNumber, Ipv4Header, Ipv4HeaderSlice};

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternetDatagram {
    pub header: Ipv4Header,
    pub payload: Vec<u8>,
}

impl InternetDatagram {
    pub fn new(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        protocol: IpNumber,
        ttl: u8,
        payload: Vec<u8>,
    ) -> Result<Self, ParseError> {
        let mut header = Ipv4Header::new(
            payload.len() as u16,
            ttl,
            protocol,
            source.octets(),
            destination.octets(),
        )
        .map_err(|err| ParseError::Ipv4(err.to_string()))?;
        header.header_checksum = header.calc_header_checksum();
        Ok(Self { header, payload })
    }

    /// Decode a datagram from the front of `data`, honouring the header's
    /// total-length field. Trailing bytes beyond it are ignored.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let slice =
            Ipv4HeaderSlice::from_slice(data).map_err(|err| ParseError::Ipv4(err.to_string()))?;
        let header_len = slice.slice().len();
        let total_len = slice.total_len() as usize;
        if total_len < header_len || total_len > data.len() {
            return Err(ParseError::Ipv4(format!(
                "total length {} outside buffer of {} bytes",
                total_len,
                data.len()
            )));
        }
        Ok(Self {
            header: slice.to_header(),
            payload: data[header_len..total_len].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header.header_len() as usize + self.payload.len());
        let _ = self.header.write(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.header.destination)
    }

    pub fn destination_numeric(&self) -> u32 {
        u32::from_be_bytes(self.header.destination)
    }

    /// Recompute the header checksum after a header mutation (e.g. a TTL
    /// decrement).
    pub fn refresh_checksum(&mut self) {
        self.header.header_checksum = self.header.calc_header_checksum();
    }
}
