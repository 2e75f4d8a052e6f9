//! ARP messages for resolving IPv4 addresses to Ethernet addresses. Only
//! the Ethernet/IPv4 flavour is supported; anything else fails to parse.

use crate::error::ParseError;

use super::ethernet::{EthernetAddress, ETHERTYPE_IPV4};

pub const OPCODE_REQUEST: u16 = 1;
pub const OPCODE_REPLY: u16 = 2;

const HARDWARE_ETHERNET: u16 = 1;
const MESSAGE_LEN: usize = 28;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArpMessage {
    pub opcode: u16,
    pub sender_ethernet_address: EthernetAddress,
    pub sender_ip_address: u32,
    pub target_ethernet_address: EthernetAddress,
    pub target_ip_address: u32,
}

impl ArpMessage {
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < MESSAGE_LEN {
            return Err(ParseError::Truncated(data.len()));
        }
        let hardware_type = u16::from_be_bytes([data[0], data[1]]);
        let protocol_type = u16::from_be_bytes([data[2], data[3]]);
        let hardware_len = data[4];
        let protocol_len = data[5];
        if hardware_type != HARDWARE_ETHERNET
            || protocol_type != ETHERTYPE_IPV4
            || hardware_len != 6
            || protocol_len != 4
        {
            return Err(ParseError::UnsupportedArp);
        }

        let mut sender_ethernet_address = [0u8; 6];
        let mut target_ethernet_address = [0u8; 6];
        sender_ethernet_address.copy_from_slice(&data[8..14]);
        target_ethernet_address.copy_from_slice(&data[18..24]);
        Ok(Self {
            opcode: u16::from_be_bytes([data[6], data[7]]),
            sender_ethernet_address,
            sender_ip_address: u32::from_be_bytes([data[14], data[15], data[16], data[17]]),
            target_ethernet_address,
            target_ip_address: u32::from_be_bytes([data[24], data[25], data[26], data[27]]),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MESSAGE_LEN);
        out.extend_from_slice(&HARDWARE_ETHERNET.to_be_bytes());
        out.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
        out.push(6);
        out.push(4);
        out.extend_from_slice(&self.opcode.to_be_bytes());
        out.extend_from_slice(&self.sender_ethernet_address);
        out.extend_from_slice(&self.sender_ip_address.to_be_bytes());
        out.extend_from_slice(&self.target_ethernet_address);
        out.extend_from_slice(&self.target_ip_address.to_be_bytes());
        out
    }
}
