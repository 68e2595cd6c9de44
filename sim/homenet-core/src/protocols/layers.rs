//! Generators for single OSI layer events, and the short exchanges composed
//! from them: the full-stack preamble of a connection, ping and DHCP.
//!
//! The generators hold no state. Each builds one event with a layer-specific
//! payload and hands it to the sink. Transport-layer TCP events are not
//! generated here; the sink mirrors them from the TCP session log.

use crate::{
    address::{Address, Ipv4Address, Mac},
    event::{
        ArpMessage, ArpOperation, DhcpMessage, DhcpMessageType, EthernetFrame, FrameType,
        IcmpMessage, IcmpType, Ipv4Packet, Payload, PhysicalSignal, PresentationMessage,
        SessionAction, SessionMessage, SignalStatus, UdpDatagram,
    },
    protocols::checksum,
    simulation::Context,
};
use rand::Rng;
use serde_json::Value;
use std::time::Duration;

/// The largest Ethernet frame, in bytes.
pub const MAX_FRAME_SIZE: u16 = 1518;

pub const DHCP_SERVER_PORT: u16 = 67;
pub const DHCP_CLIENT_PORT: u16 = 68;
pub const DHCP_SUBNET: Ipv4Address = Ipv4Address::new([255, 255, 255, 0]);
pub const DHCP_DNS: Ipv4Address = Ipv4Address::new([8, 8, 8, 8]);
/// Lease duration handed out by the DHCP server, in seconds.
pub const DHCP_LEASE_TIME: u32 = 86400;

/// Time between the steps of a DHCP exchange.
pub const DHCP_STEP: Duration = Duration::from_millis(500);

/// Time between an ICMP echo request and its reply.
pub const PING_REPLY_DELAY: Duration = Duration::from_millis(100);

pub fn physical(
    ctx: &mut Context<'_>,
    src: impl Into<Address>,
    dst: impl Into<Address>,
    status: SignalStatus,
) -> u64 {
    ctx.record(src, dst, Payload::Physical(PhysicalSignal::new(status)))
}

pub fn data_link(
    ctx: &mut Context<'_>,
    src: impl Into<Address>,
    dst: impl Into<Address>,
    source_mac: Mac,
    destination_mac: Mac,
    frame_type: FrameType,
) -> u64 {
    let frame = EthernetFrame {
        frame_type,
        source_mac,
        destination_mac,
        frame_size: MAX_FRAME_SIZE,
        checksum: checksum(&mut *ctx.rng),
        vlan: None,
    };
    ctx.record(src, dst, Payload::DataLink(frame))
}

pub fn network(ctx: &mut Context<'_>, src: Ipv4Address, dst: Ipv4Address) -> u64 {
    let packet = Ipv4Packet {
        source_ip: src,
        destination_ip: dst,
        version: 4,
        header_length: 20,
        ttl: 64,
        fragment_offset: 0,
        checksum: checksum(&mut *ctx.rng),
    };
    ctx.record(src, dst, Payload::Ipv4(packet))
}

/// An ARP request or reply. Requests carry a zero target MAC, since that is
/// what they ask for.
pub fn arp(
    ctx: &mut Context<'_>,
    sender_ip: Ipv4Address,
    target_ip: Ipv4Address,
    operation: ArpOperation,
) -> u64 {
    let message = ArpMessage {
        operation,
        sender_mac: ctx.home.mac_for(sender_ip),
        sender_ip,
        target_mac: match operation {
            ArpOperation::Request => Mac::ZERO,
            ArpOperation::Reply => ctx.home.mac_for(target_ip),
        },
        target_ip,
        hardware_type: "Ethernet",
        protocol_type: "IPv4",
    };
    let dst = match operation {
        ArpOperation::Request => Address::Host(Ipv4Address::BROADCAST),
        ArpOperation::Reply => Address::Host(target_ip),
    };
    ctx.record(sender_ip, dst, Payload::Arp(message))
}

pub fn icmp(ctx: &mut Context<'_>, src: Ipv4Address, dst: Ipv4Address, kind: IcmpType) -> u64 {
    let message = IcmpMessage {
        kind,
        code: 0,
        source_ip: src,
        destination_ip: dst,
        sequence: ctx.rng.gen_range(0..100),
        identifier: ctx.rng.gen_range(0..1000),
        data: match kind {
            IcmpType::EchoRequest => "ping test data",
            IcmpType::EchoReply => "pong response",
        },
    };
    ctx.record(src, dst, Payload::Icmp(message))
}

/// A UDP datagram with a random length between a bare header and 507 bytes.
pub fn udp(
    ctx: &mut Context<'_>,
    src: impl Into<Address>,
    dst: impl Into<Address>,
    source_port: u16,
    destination_port: u16,
) -> u64 {
    let datagram = UdpDatagram {
        source_port,
        destination_port,
        length: ctx.rng.gen_range(8..508),
        checksum: checksum(&mut *ctx.rng),
    };
    ctx.record(src, dst, Payload::Udp(datagram))
}

pub fn session(
    ctx: &mut Context<'_>,
    src: Ipv4Address,
    dst: Ipv4Address,
    session_id: String,
    action: SessionAction,
) -> u64 {
    ctx.record(src, dst, Payload::Session(SessionMessage::new(session_id, action)))
}

pub fn presentation(
    ctx: &mut Context<'_>,
    src: Ipv4Address,
    dst: Ipv4Address,
    data_type: &str,
    encrypted: bool,
) -> u64 {
    ctx.record(
        src,
        dst,
        Payload::Presentation(PresentationMessage::new(data_type, encrypted)),
    )
}

/// The deferred parts of the composed exchanges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerStep {
    ArpReply {
        src: Ipv4Address,
        dst: Ipv4Address,
    },
    Packet {
        src: Ipv4Address,
        dst: Ipv4Address,
    },
    SessionEstablish {
        src: Ipv4Address,
        dst: Ipv4Address,
        session_id: String,
    },
    Encryption {
        src: Ipv4Address,
        dst: Ipv4Address,
    },
    EchoReply {
        src: Ipv4Address,
        dst: Ipv4Address,
    },
    Dhcp {
        client: Ipv4Address,
        message_type: DhcpMessageType,
    },
}

/// The lower-layer preamble of a connection from `src` to `dst`: physical
/// and data link now, then ARP resolution, the IP packet, session
/// establishment and TLS at 100 ms steps. `data` describes what is being
/// carried; only its presence in the trace log matters.
pub fn simulate_full_stack_communication(
    ctx: &mut Context<'_>,
    src: Ipv4Address,
    dst: Ipv4Address,
    data: Value,
) {
    tracing::trace!(target: "EVENT", %src, %dst, %data, "full stack communication");
    let (src_mac, dst_mac) = (ctx.home.mac_for(src), ctx.home.mac_for(dst));
    let session_id = format!("{:08x}", ctx.rng.next_u32());

    physical(ctx, src, dst, SignalStatus::Transmit);
    data_link(ctx, src, dst, src_mac, dst_mac, FrameType::Data);
    arp(ctx, src, dst, ArpOperation::Request);

    let step = Duration::from_millis(100);
    ctx.schedule(step, LayerStep::ArpReply { src: dst, dst: src });
    ctx.schedule(2 * step, LayerStep::Packet { src, dst });
    ctx.schedule(
        3 * step,
        LayerStep::SessionEstablish {
            src,
            dst,
            session_id,
        },
    );
    ctx.schedule(4 * step, LayerStep::Encryption { src, dst });
}

/// An ICMP echo request now and its reply shortly after.
pub fn simulate_ping(ctx: &mut Context<'_>, src: Ipv4Address, dst: Ipv4Address) {
    icmp(ctx, src, dst, IcmpType::EchoRequest);
    ctx.schedule(PING_REPLY_DELAY, LayerStep::EchoReply { src: dst, dst: src });
}

/// A DHCP lease negotiation for `client`: DISCOVER now, then OFFER, REQUEST
/// and ACK at [`DHCP_STEP`] intervals.
pub fn simulate_dhcp(ctx: &mut Context<'_>, client: Ipv4Address) {
    dhcp_step(ctx, client, DhcpMessageType::Discover);
}

fn dhcp_step(ctx: &mut Context<'_>, client: Ipv4Address, message_type: DhcpMessageType) {
    let server = ctx.home.server.address;
    let server_mac = ctx.home.mac_for(server);
    let unassigned = Ipv4Address::CURRENT_NETWORK;
    let broadcast = Ipv4Address::BROADCAST;

    let next = match message_type {
        DhcpMessageType::Discover => {
            data_link(ctx, unassigned, broadcast, Mac::ZERO, Mac::BROADCAST, FrameType::Broadcast);
            udp(ctx, unassigned, broadcast, DHCP_CLIENT_PORT, DHCP_SERVER_PORT);
            ctx.record(unassigned, broadcast, Payload::Dhcp(DhcpMessage::discover(Mac::ZERO)));
            Some(DhcpMessageType::Offer)
        }
        DhcpMessageType::Offer => {
            data_link(ctx, server, broadcast, server_mac, Mac::BROADCAST, FrameType::Unicast);
            udp(ctx, server, broadcast, DHCP_SERVER_PORT, DHCP_CLIENT_PORT);
            let offer = DhcpMessage::offer(client, DHCP_SUBNET, server, DHCP_DNS, DHCP_LEASE_TIME);
            ctx.record(server, broadcast, Payload::Dhcp(offer));
            Some(DhcpMessageType::Request)
        }
        DhcpMessageType::Request => {
            data_link(ctx, unassigned, broadcast, Mac::ZERO, Mac::BROADCAST, FrameType::Broadcast);
            udp(ctx, unassigned, broadcast, DHCP_CLIENT_PORT, DHCP_SERVER_PORT);
            ctx.record(unassigned, broadcast, Payload::Dhcp(DhcpMessage::request(client)));
            Some(DhcpMessageType::Ack)
        }
        DhcpMessageType::Ack => {
            let client_mac = ctx.home.mac_for(client);
            data_link(ctx, server, client, server_mac, client_mac, FrameType::Unicast);
            udp(ctx, server, client, DHCP_SERVER_PORT, DHCP_CLIENT_PORT);
            let ack = DhcpMessage::ack(client, DHCP_SUBNET, server, DHCP_DNS, DHCP_LEASE_TIME);
            ctx.record(server, client, Payload::Dhcp(ack));
            None
        }
    };

    if let Some(message_type) = next {
        ctx.schedule(
            DHCP_STEP,
            LayerStep::Dhcp {
                client,
                message_type,
            },
        );
    }
}

pub fn fire(ctx: &mut Context<'_>, step: LayerStep) {
    match step {
        LayerStep::ArpReply { src, dst } => {
            arp(ctx, src, dst, ArpOperation::Reply);
        }
        LayerStep::Packet { src, dst } => {
            network(ctx, src, dst);
        }
        LayerStep::SessionEstablish {
            src,
            dst,
            session_id,
        } => {
            session(ctx, src, dst, session_id, SessionAction::Establish);
        }
        LayerStep::Encryption { src, dst } => {
            presentation(ctx, src, dst, "application/json", true);
        }
        LayerStep::EchoReply { src, dst } => {
            icmp(ctx, src, dst, IcmpType::EchoReply);
        }
        LayerStep::Dhcp {
            client,
            message_type,
        } => dhcp_step(ctx, client, message_type),
    }
}
