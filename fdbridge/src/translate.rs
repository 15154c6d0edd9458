//! Translation between CAN-FD frames and wire packets.

use crate::{
    clamp_len,
    frame::{decode_id, decode_length, FdFrame},
    packet::WirePacket,
    session::Session,
    Address, CONTROL_WORD_LEN,
};
use core::net::Ipv4Addr;
use embedded_can::{Frame, Id};

/// Outcome of an inbound packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Inbound {
    /// Discovery message, the session now points at the sender.
    Discovered([u8; 4]),
    /// Nothing to forward.
    Dropped,
    /// Frame to transmit on the bus.
    Forward(FdFrame),
}

/// Translate a received bus frame into a packet for the current destination.
///
/// Never reads past the frame's data: a short frame yields zero bytes for
/// the missing part of the control word and payload.
pub fn outbound(frame: &impl Frame, session: &Session) -> (WirePacket, Ipv4Addr) {
    let id = match frame.id() {
        Id::Standard(id) => id.as_raw() as u32,
        Id::Extended(id) => id.as_raw(),
    };
    let (from, to) = decode_id(id);

    let data = frame.data();
    let mut word = [0u8; CONTROL_WORD_LEN];
    let available = data.len().min(CONTROL_WORD_LEN);
    word[..available].copy_from_slice(&data[..available]);
    let data_len = decode_length(word);

    let payload = data.get(CONTROL_WORD_LEN..).unwrap_or(&[]);
    let packet = WirePacket::new(from.into(), to.into(), data_len as u16, payload);

    (packet, session.destination())
}

/// Translate a datagram received from `source`.
///
/// Discovery messages retarget `session`, empty messages are dropped and
/// everything else becomes a frame addressed with the low 5 bits of the
/// packet addresses.
pub fn inbound(packet: &WirePacket, source: Ipv4Addr, session: &Session) -> Inbound {
    if packet.is_discovery() {
        session.set_destination(source);

        #[cfg(feature = "defmt-03")]
        defmt::info!("Destination set to {}", source.octets());

        return Inbound::Discovered(source.octets());
    }

    if packet.data_len.get() == 0 {
        #[cfg(feature = "defmt-03")]
        defmt::debug!("Dropping empty packet");

        return Inbound::Dropped;
    }

    let from = Address::truncate(packet.from_address.get());
    let to = Address::truncate(packet.to_address.get());
    let data_len = clamp_len(packet.data_len.get() as usize);

    match FdFrame::build(from, to, &packet.data[..data_len]) {
        Some(frame) => Inbound::Forward(frame),
        None => Inbound::Dropped,
    }
}
