//! A network interface: speaks IPv4 over Ethernet, resolving next-hop
//! addresses with ARP and holding datagrams back until resolution
//! completes.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::wire::arp::{ArpMessage, OPCODE_REPLY, OPCODE_REQUEST};
use crate::wire::ethernet::{
    EthernetAddress, EthernetFrame, EthernetHeader, ETHERNET_BROADCAST, ETHERTYPE_ARP,
    ETHERTYPE_IPV4,
};
use crate::wire::ipv4::InternetDatagram;

/// How long a learned IP-to-Ethernet mapping stays usable.
const ARP_ENTRY_TTL_MS: u64 = 30_000;
/// Minimum spacing between ARP requests for the same address.
const ARP_REQUEST_COOLDOWN_MS: u64 = 5_000;

/// Where outbound frames go. The sink is fire-and-forget: the interface
/// never hears back about a frame once transmitted.
pub trait FrameSink {
    fn transmit(&mut self, frame: EthernetFrame);
}

/// A frame queue is a perfectly good sink; tests and single-threaded
/// drivers pump it by hand.
impl FrameSink for VecDeque<EthernetFrame> {
    fn transmit(&mut self, frame: EthernetFrame) {
        self.push_back(frame);
    }
}

struct ArpEntry {
    ethernet_address: EthernetAddress,
    age_ms: u64,
}

pub struct NetworkInterface {
    name: String,
    port: Rc<RefCell<dyn FrameSink>>,
    ethernet_address: EthernetAddress,
    ip_address: Ipv4Addr,
    datagrams_received: VecDeque<InternetDatagram>,
    arp_cache: HashMap<u32, ArpEntry>,
    /// Datagrams waiting for their next hop to resolve, keyed by that hop.
    pending: HashMap<u32, Vec<InternetDatagram>>,
    /// Age of the outstanding ARP request per queried address.
    requests_in_flight: HashMap<u32, u64>,
}

impl NetworkInterface {
    pub fn new(
        name: impl Into<String>,
        port: Rc<RefCell<dyn FrameSink>>,
        ethernet_address: EthernetAddress,
        ip_address: Ipv4Addr,
    ) -> Self {
        let name = name.into();
        debug!(name = %name, eth = ?ethernet_address, ip = %ip_address, "network interface up");
        Self {
            name,
            port,
            ethernet_address,
            ip_address,
            datagrams_received: VecDeque::new(),
            arp_cache: HashMap::new(),
            pending: HashMap::new(),
            requests_in_flight: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ethernet_address(&self) -> EthernetAddress {
        self.ethernet_address
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }

    /// Send `dgram` toward `next_hop`, which is on this interface's
    /// segment (the final destination, or the router one hop along). If
    /// the hop's Ethernet address is unknown the datagram is parked and an
    /// ARP request goes out instead, unless one is already in flight.
    pub fn send_datagram(&mut self, dgram: InternetDatagram, next_hop: Ipv4Addr) {
        let hop = u32::from(next_hop);

        if let Some(entry) = self.arp_cache.get(&hop) {
            let dst = entry.ethernet_address;
            self.transmit(dst, ETHERTYPE_IPV4, dgram.serialize());
            return;
        }

        self.pending.entry(hop).or_default().push(dgram);

        match self.requests_in_flight.get(&hop) {
            Some(&age) if age < ARP_REQUEST_COOLDOWN_MS => {}
            _ => {
                let request = ArpMessage {
                    opcode: OPCODE_REQUEST,
                    sender_ethernet_address: self.ethernet_address,
                    sender_ip_address: u32::from(self.ip_address),
                    target_ethernet_address: [0; 6],
                    target_ip_address: hop,
                };
                self.transmit(ETHERNET_BROADCAST, ETHERTYPE_ARP, request.serialize());
                self.requests_in_flight.insert(hop, 0);
            }
        }
    }

    /// Accept a frame off the wire. IPv4 payloads addressed to us queue up
    /// for the owner to collect; ARP payloads teach us mappings and may
    /// warrant a reply.
    pub fn recv_frame(&mut self, frame: EthernetFrame) {
        if frame.header.dst != ETHERNET_BROADCAST && frame.header.dst != self.ethernet_address {
            return;
        }

        match frame.header.ethertype {
            ETHERTYPE_IPV4 => match InternetDatagram::parse(&frame.payload) {
                Ok(dgram) => self.datagrams_received.push_back(dgram),
                Err(err) => trace!(name = %self.name, %err, "dropping malformed datagram"),
            },
            ETHERTYPE_ARP => match ArpMessage::parse(&frame.payload) {
                Ok(message) => self.recv_arp(message),
                Err(err) => trace!(name = %self.name, %err, "dropping malformed arp"),
            },
            _ => {}
        }
    }

    fn recv_arp(&mut self, message: ArpMessage) {
        if message.target_ip_address != u32::from(self.ip_address) {
            return;
        }

        // learn from any ARP aimed at us, request or reply
        self.arp_cache.insert(
            message.sender_ip_address,
            ArpEntry {
                ethernet_address: message.sender_ethernet_address,
                age_ms: 0,
            },
        );

        if let Some(waiting) = self.pending.remove(&message.sender_ip_address) {
            let next_hop = Ipv4Addr::from(message.sender_ip_address);
            for dgram in waiting {
                self.send_datagram(dgram, next_hop);
            }
        }

        if message.opcode == OPCODE_REQUEST {
            let reply = ArpMessage {
                opcode: OPCODE_REPLY,
                sender_ethernet_address: self.ethernet_address,
                sender_ip_address: u32::from(self.ip_address),
                target_ethernet_address: message.sender_ethernet_address,
                target_ip_address: message.sender_ip_address,
            };
            self.transmit(
                message.sender_ethernet_address,
                ETHERTYPE_ARP,
                reply.serialize(),
            );
        }
    }

    /// Age the ARP cache and the outstanding-request table by
    /// `ms_since_last_tick` milliseconds, expiring what is too old.
    pub fn tick(&mut self, ms_since_last_tick: u64) {
        self.arp_cache.retain(|_, entry| {
            entry.age_ms += ms_since_last_tick;
            entry.age_ms < ARP_ENTRY_TTL_MS
        });
        self.requests_in_flight.retain(|_, age| {
            *age += ms_since_last_tick;
            *age < ARP_REQUEST_COOLDOWN_MS
        });
    }

    /// Next datagram received for local delivery or forwarding.
    pub fn pop_datagram(&mut self) -> Option<InternetDatagram> {
        self.datagrams_received.pop_front()
    }

    fn transmit(&self, dst: EthernetAddress, ethertype: u16, payload: Vec<u8>) {
        let frame = EthernetFrame {
            header: EthernetHeader {
                dst,
                src: self.ethernet_address,
                ethertype,
            },
            payload,
        };
        self.port.borrow_mut().transmit(frame);
    }
}
