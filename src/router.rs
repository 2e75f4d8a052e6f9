//! A longest-prefix-match IPv4 router over a set of network interfaces.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use tracing::{debug, trace};

use crate::iface::NetworkInterface;

#[derive(Debug, Clone, Copy)]
struct Route {
    next_hop: Option<Ipv4Addr>,
    interface_num: usize,
}

/// Owns its interfaces; callers hold onto the index `add_interface`
/// returns and reach the interface through it.
#[derive(Default)]
pub struct Router {
    interfaces: Vec<NetworkInterface>,
    /// Keyed by (prefix_length, prefix) and scanned in descending order,
    /// so the longest matching prefix is found first. Reinstalling the
    /// same prefix replaces the earlier route.
    routes: BTreeMap<(u8, u32), Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interface(&mut self, interface: NetworkInterface) -> usize {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    pub fn interface(&self, index: usize) -> &NetworkInterface {
        &self.interfaces[index]
    }

    pub fn interface_mut(&mut self, index: usize) -> &mut NetworkInterface {
        &mut self.interfaces[index]
    }

    /// Install a forwarding rule: datagrams whose destination matches the
    /// top `prefix_length` bits of `prefix` leave through interface
    /// `interface_num`, toward `next_hop` if given and directly to their
    /// destination otherwise.
    pub fn add_route(
        &mut self,
        prefix: Ipv4Addr,
        prefix_length: u8,
        next_hop: Option<Ipv4Addr>,
        interface_num: usize,
    ) {
        debug!(%prefix, prefix_length, ?next_hop, interface_num, "route installed");
        self.routes.insert(
            (prefix_length, u32::from(prefix)),
            Route {
                next_hop,
                interface_num,
            },
        );
    }

    /// Drain every interface's received-datagram queue and forward each
    /// datagram per the routing table. Datagrams out of TTL, or with no
    /// matching route, are dropped.
    pub fn route(&mut self) {
        for index in 0..self.interfaces.len() {
            while let Some(mut dgram) = self.interfaces[index].pop_datagram() {
                if dgram.header.time_to_live <= 1 {
                    trace!(dst = %dgram.destination(), "ttl expired");
                    continue;
                }
                dgram.header.time_to_live -= 1;
                dgram.refresh_checksum();

                let Some(route) = self.lookup(dgram.destination_numeric()) else {
                    trace!(dst = %dgram.destination(), "no route");
                    continue;
                };
                let next_hop = route.next_hop.unwrap_or_else(|| dgram.destination());
                self.interfaces[route.interface_num].send_datagram(dgram, next_hop);
            }
        }
    }

    fn lookup(&self, destination: u32) -> Option<Route> {
        self.routes
            .iter()
            .rev()
            .find_map(|(&(prefix_length, prefix), &route)| {
                let matches = prefix_length == 0
                    || destination >> (32 - prefix_length) == prefix >> (32 - prefix_length);
                matches.then_some(route)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::arp::ArpMessage;
    use crate::wire::ethernet::{EthernetAddress, EthernetFrame, ETHERTYPE_ARP};
    use crate::wire::ipv4::InternetDatagram;
    use etherparse::IpNumber;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type SharedQueue = Rc<RefCell<VecDeque<EthernetFrame>>>;

    fn test_interface(index: u8) -> (NetworkInterface, SharedQueue) {
        let queue: SharedQueue = Rc::new(RefCell::new(VecDeque::new()));
        let eth: EthernetAddress = [0x02, 0, 0, 0, 0, index];
        let iface = NetworkInterface::new(
            format!("eth{index}"),
            queue.clone(),
            eth,
            Ipv4Addr::new(172, 16, index, 1),
        );
        (iface, queue)
    }

    fn three_way_router() -> (Router, Vec<SharedQueue>) {
        let mut router = Router::new();
        let mut queues = Vec::new();
        for index in 0..3 {
            let (iface, queue) = test_interface(index);
            router.add_interface(iface);
            queues.push(queue);
        }
        router.add_route(Ipv4Addr::new(10, 0, 0, 0), 8, None, 0);
        router.add_route(Ipv4Addr::new(10, 0, 0, 0), 24, None, 1);
        router.add_route(
            Ipv4Addr::new(0, 0, 0, 0),
            0,
            Some(Ipv4Addr::new(172, 16, 2, 254)),
            2,
        );
        (router, queues)
    }

    fn inbound(destination: Ipv4Addr, ttl: u8) -> InternetDatagram {
        InternetDatagram::new(
            Ipv4Addr::new(192, 0, 2, 1),
            destination,
            IpNumber::UDP,
            ttl,
            b"forward me".to_vec(),
        )
        .unwrap()
    }

    fn deliver(router: &mut Router, index: usize, dgram: InternetDatagram) {
        let dst = router.interface(index).ethernet_address();
        let frame = EthernetFrame {
            header: crate::wire::ethernet::EthernetHeader {
                dst,
                src: [0x02, 0xff, 0, 0, 0, 0],
                ethertype: crate::wire::ethernet::ETHERTYPE_IPV4,
            },
            payload: dgram.serialize(),
        };
        router.interface_mut(index).recv_frame(frame);
    }

    /// The egress interface reveals itself by the ARP request it makes for
    /// the resolved next hop.
    fn arp_target(queue: &SharedQueue) -> Option<Ipv4Addr> {
        let frames: Vec<_> = queue.borrow_mut().drain(..).collect();
        frames
            .iter()
            .find(|f| f.header.ethertype == ETHERTYPE_ARP)
            .map(|f| {
                let arp = ArpMessage::parse(&f.payload).unwrap();
                Ipv4Addr::from(arp.target_ip_address)
            })
    }

    #[test]
    fn longest_prefix_wins() {
        let (mut router, queues) = three_way_router();

        deliver(&mut router, 2, inbound(Ipv4Addr::new(10, 0, 5, 5), 64));
        router.route();
        assert_eq!(arp_target(&queues[0]), Some(Ipv4Addr::new(10, 0, 5, 5)));
        assert_eq!(arp_target(&queues[1]), None);

        deliver(&mut router, 2, inbound(Ipv4Addr::new(10, 0, 0, 7), 64));
        router.route();
        assert_eq!(arp_target(&queues[1]), Some(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(arp_target(&queues[0]), None);
    }

    #[test]
    fn default_route_uses_configured_next_hop() {
        let (mut router, queues) = three_way_router();
        deliver(&mut router, 0, inbound(Ipv4Addr::new(192, 168, 1, 1), 64));
        router.route();
        // next hop is the gateway, not the final destination
        assert_eq!(arp_target(&queues[2]), Some(Ipv4Addr::new(172, 16, 2, 254)));
    }

    #[test]
    fn ttl_expiry_drops() {
        let (mut router, queues) = three_way_router();
        deliver(&mut router, 2, inbound(Ipv4Addr::new(10, 0, 5, 5), 1));
        deliver(&mut router, 2, inbound(Ipv4Addr::new(10, 0, 5, 5), 0));
        router.route();
        for queue in &queues {
            assert!(queue.borrow().is_empty());
        }
    }

    #[test]
    fn no_matching_route_drops() {
        let mut router = Router::new();
        let (iface, queue) = test_interface(0);
        router.add_interface(iface);
        router.add_route(Ipv4Addr::new(10, 0, 0, 0), 8, None, 0);

        deliver(&mut router, 0, inbound(Ipv4Addr::new(192, 168, 1, 1), 64));
        router.route();
        assert!(queue.borrow().is_empty());
    }

    #[test]
    fn ttl_is_decremented_and_checksum_refreshed() {
        let (mut router, queues) = three_way_router();

        // teach interface 0 the hop's address so the datagram goes out as
        // IPv4 instead of waiting on ARP
        let hop = Ipv4Addr::new(10, 0, 5, 5);
        let reply = ArpMessage {
            opcode: crate::wire::arp::OPCODE_REPLY,
            sender_ethernet_address: [0x02, 0xaa, 0, 0, 0, 1],
            sender_ip_address: u32::from(hop),
            target_ethernet_address: router.interface(0).ethernet_address(),
            target_ip_address: u32::from(router.interface(0).ip_address()),
        };
        let frame = EthernetFrame {
            header: crate::wire::ethernet::EthernetHeader {
                dst: router.interface(0).ethernet_address(),
                src: [0x02, 0xaa, 0, 0, 0, 1],
                ethertype: ETHERTYPE_ARP,
            },
            payload: reply.serialize(),
        };
        router.interface_mut(0).recv_frame(frame);
        queues[0].borrow_mut().clear();

        deliver(&mut router, 2, inbound(hop, 64));
        router.route();

        let frames: Vec<_> = queues[0].borrow_mut().drain(..).collect();
        assert_eq!(frames.len(), 1);
        let forwarded = InternetDatagram::parse(&frames[0].payload).unwrap();
        assert_eq!(forwarded.header.time_to_live, 63);
        let mut expected = forwarded.clone();
        expected.refresh_checksum();
        assert_eq!(forwarded.header.header_checksum, expected.header.header_checksum);
    }
}
