//! Wire packet exchanged over UDP.

use crate::{
    Error, DISCOVERY_SENTINEL, LIVENESS_SENTINEL, MAX_DATA_LEN, PACKET_LEN,
};
use zerocopy::{
    byteorder::{LittleEndian, U16},
    AsBytes, FromBytes, FromZeroes,
};

/// Fixed-layout UDP payload.
///
/// All fields are little-endian. Bytes of `data` past `data_len` carry no
/// meaning and are zero on packets built by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct WirePacket {
    pub from_address: U16<LittleEndian>,
    pub to_address: U16<LittleEndian>,
    pub data_len: U16<LittleEndian>,
    pub data: [u8; MAX_DATA_LEN],
}

const _: () = assert!(core::mem::size_of::<WirePacket>() == PACKET_LEN);

impl WirePacket {
    /// Build a packet, zero padding `data` or truncating it to 60 bytes.
    pub fn new(from: u16, to: u16, data_len: u16, data: &[u8]) -> Self {
        let mut packet = WirePacket::new_zeroed();
        packet.from_address.set(from);
        packet.to_address.set(to);
        packet.data_len.set(data_len);

        let len = data.len().min(MAX_DATA_LEN);
        packet.data[..len].copy_from_slice(&data[..len]);

        packet
    }

    /// Liveness probe: from and to set to `0xFF`, no payload.
    pub fn liveness() -> Self {
        WirePacket::new(LIVENESS_SENTINEL, LIVENESS_SENTINEL, 0, &[])
    }

    /// Discovery message: from and to set to `0xFFFF`, no payload.
    ///
    /// Sent by a controller to make its address the gateway's destination.
    /// The gateway ignores `data_len` and `data` of such a message.
    pub fn discovery() -> Self {
        WirePacket::new(DISCOVERY_SENTINEL, DISCOVERY_SENTINEL, 0, &[])
    }

    /// Extract the fields of a received datagram.
    ///
    /// Only the length is checked, `data_len` is taken as-is.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        WirePacket::read_from(bytes)
            .ok_or(Error::MalformedPacket { len: bytes.len() })
    }

    /// Whether both addresses carry the discovery sentinel `0xFFFF`.
    pub fn is_discovery(&self) -> bool {
        self.from_address.get() == DISCOVERY_SENTINEL
            && self.to_address.get() == DISCOVERY_SENTINEL
    }

    /// Whether this is a liveness probe: both addresses `0xFF` and an empty
    /// payload.
    ///
    /// Lets a controller tell the gateway's probes apart from bus traffic.
    pub fn is_liveness(&self) -> bool {
        self.from_address.get() == LIVENESS_SENTINEL
            && self.to_address.get() == LIVENESS_SENTINEL
            && self.data_len.get() == 0
    }

    /// Valid part of `data` according to `data_len`.
    pub fn payload(&self) -> &[u8] {
        let len = (self.data_len.get() as usize).min(MAX_DATA_LEN);
        &self.data[..len]
    }
}
