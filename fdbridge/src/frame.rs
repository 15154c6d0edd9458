//! Addressing and length scheme carried by a CAN-FD frame.
//!
//! Identifier, bit 0 is the LSB:
//!
//! | bits    | field                                   |
//! |---------|-----------------------------------------|
//! | 0..=4   | destination address                     |
//! | 5       | extended length, frame longer than 32 B |
//! | 6..=10  | source address                          |
//!
//! The first four payload bytes hold a little-endian control word whose low
//! 6 bits are the application payload length. The payload follows.

use crate::{clamp_len, Address, CONTROL_WORD_LEN, FD_MAX_LEN, MAX_DATA_LEN};
use embedded_can::{Frame, Id, StandardId};

/// Longest frame that fits the classic FD data region.
const SHORT_FRAME_MAX: usize = 32;

bitfield::bitfield! {
    /// Frame identifier address fields.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct FrameId(u32);
    impl Debug;
    pub u8, to_address, set_to_address: 4, 0;
    pub u8, from_address, set_from_address: 10, 6;
}

/// Identifier flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct IdFlags(u32);

bitflags::bitflags! {
    impl IdFlags: u32 {
        const ExtendedLength = 1 << 5;
    }
}

impl IdFlags {
    /// Flags for a frame of `frame_len` total bytes.
    pub fn from_frame_len(frame_len: usize) -> Self {
        let mut flags = IdFlags::empty();

        if frame_len > SHORT_FRAME_MAX {
            flags |= IdFlags::ExtendedLength;
        }

        flags
    }
}

bitfield::bitfield! {
    /// Control word at the start of the payload.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct ControlWord(u32);
    impl Debug;
    pub u8, data_len, set_data_len: 5, 0;
}

/// Source and destination address of an identifier. Bit 5 is ignored.
pub fn decode_id(id: u32) -> (Address, Address) {
    let id = FrameId(id);

    (
        Address::truncate(id.from_address() as u16),
        Address::truncate(id.to_address() as u16),
    )
}

/// Payload length held by a control word, clamped into `1..=60`.
pub fn decode_length(word: [u8; CONTROL_WORD_LEN]) -> usize {
    let word = ControlWord(u32::from_le_bytes(word));

    clamp_len(word.data_len() as usize)
}

pub fn encode_id(from: Address, to: Address, frame_len: usize) -> u32 {
    let mut id = FrameId(0);
    id.set_to_address(to.into());
    id.set_from_address(from.into());

    id.0 | IdFlags::from_frame_len(frame_len).bits()
}

/// Control word for `data_len`, which must already be in `1..=60`.
pub fn encode_control_word(data_len: usize) -> u32 {
    let mut word = ControlWord(0);
    word.set_data_len(data_len as u8);

    word.0
}

/// CAN-FD data frame with a standard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdFrame {
    id: StandardId,
    len: u8,
    data: [u8; FD_MAX_LEN],
}

impl FdFrame {
    /// Build the frame carrying `payload` from `from` to `to`.
    ///
    /// `payload` is clamped to 60 bytes, an empty payload is sent as one
    /// zero byte.
    pub fn build(from: Address, to: Address, payload: &[u8]) -> Option<Self> {
        let data_len = clamp_len(payload.len());
        let frame_len = data_len + CONTROL_WORD_LEN;

        let mut data = [0u8; FD_MAX_LEN];
        data[..CONTROL_WORD_LEN]
            .copy_from_slice(&encode_control_word(data_len).to_le_bytes());
        let copied = payload.len().min(MAX_DATA_LEN);
        data[CONTROL_WORD_LEN..CONTROL_WORD_LEN + copied]
            .copy_from_slice(&payload[..copied]);

        let id = StandardId::new(encode_id(from, to, frame_len) as u16)?;

        <FdFrame as Frame>::new(id, &data[..frame_len])
    }

    pub fn extended_length(&self) -> bool {
        IdFlags::from_bits_truncate(self.id.as_raw() as u32)
            .contains(IdFlags::ExtendedLength)
    }
}

#[cfg(feature = "defmt-03")]
impl defmt::Format for FdFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "FdFrame {{ id: {=u16:#x}, data: {=[u8]} }}",
            self.id.as_raw(),
            self.data(),
        )
    }
}

impl Frame for FdFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > FD_MAX_LEN {
            return None;
        }

        let id = match id.into() {
            Id::Standard(id) => id,
            // addresses never need more than 11 bits
            Id::Extended(_) => return None,
        };

        let mut frame = FdFrame {
            id,
            len: data.len() as u8,
            data: [0; FD_MAX_LEN],
        };
        frame.data[..data.len()].copy_from_slice(data);

        Some(frame)
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        // no remote frames in CAN-FD
        None
    }

    fn is_extended(&self) -> bool {
        false
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        Id::Standard(self.id)
    }

    fn dlc(&self) -> usize {
        self.len as usize
    }

    fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(value: u8) -> Address {
        Address::try_from(value).unwrap()
    }

    #[test]
    fn decode_id_fields() {
        let (from, to) = decode_id(0x41);
        assert_eq!(from, addr(1));
        assert_eq!(to, addr(1));

        let (from, to) = decode_id((7 << 6) | (1 << 5) | 30);
        assert_eq!(from, addr(7));
        assert_eq!(to, addr(30));
    }

    #[test]
    fn decode_id_ignores_high_bits() {
        let (from, to) = decode_id(0xFFFF_FFFF);
        assert_eq!(from, addr(31));
        assert_eq!(to, addr(31));
    }

    #[test]
    fn decode_length_clamps() {
        assert_eq!(decode_length([0, 0, 0, 0]), 1);
        assert_eq!(decode_length([5, 0, 0, 0]), 5);
        assert_eq!(decode_length([60, 0, 0, 0]), 60);
        assert_eq!(decode_length([61, 0, 0, 0]), 60);
        assert_eq!(decode_length([63, 0, 0, 0]), 60);
        // reserved bits don't leak into the length
        assert_eq!(decode_length([0xC5, 0xFF, 0xFF, 0xFF]), 5);
    }

    #[test]
    fn encode_id_sets_flag_past_32_bytes() {
        assert_eq!(encode_id(addr(1), addr(1), 9), 0x41);
        assert_eq!(encode_id(addr(1), addr(1), 32), 0x41);
        assert_eq!(encode_id(addr(1), addr(1), 33), 0x61);
        assert_eq!(encode_id(addr(31), addr(31), 64), 0x7FF);
    }

    #[test]
    fn control_word() {
        assert_eq!(encode_control_word(60), 60);
        assert_eq!(decode_length(encode_control_word(42).to_le_bytes()), 42);
    }

    #[test]
    fn build_frame() {
        let frame = FdFrame::build(addr(1), addr(1), b"HELLO").unwrap();

        assert_eq!(frame.id(), Id::Standard(StandardId::new(0x41).unwrap()));
        assert_eq!(frame.dlc(), 9);
        assert_eq!(frame.data(), &[5, 0, 0, 0, b'H', b'E', b'L', b'L', b'O']);
        assert!(!frame.extended_length());
    }

    #[test]
    fn build_frame_flag_matches_length() {
        for len in 1..=MAX_DATA_LEN {
            let payload = [0x5A; MAX_DATA_LEN];
            let frame =
                FdFrame::build(addr(3), addr(4), &payload[..len]).unwrap();

            assert_eq!(frame.dlc(), len + 4);
            assert_eq!(frame.extended_length(), len + 4 > 32);
        }
    }

    #[test]
    fn build_frame_clamps_payload() {
        let frame = FdFrame::build(addr(2), addr(3), &[0x11; 70]).unwrap();
        assert_eq!(frame.dlc(), FD_MAX_LEN);
        assert_eq!(frame.data()[0], 60);

        let frame = FdFrame::build(addr(2), addr(3), &[]).unwrap();
        assert_eq!(frame.data(), &[1, 0, 0, 0, 0]);
    }

    #[test]
    fn frame_trait() {
        let id = StandardId::new(0x123).unwrap();
        assert!(<FdFrame as Frame>::new(id, &[0; 64]).is_some());
        assert!(<FdFrame as Frame>::new(id, &[0; 65]).is_none());
        assert!(FdFrame::new_remote(id, 0).is_none());

        let extended = embedded_can::ExtendedId::new(0x123).unwrap();
        assert!(<FdFrame as Frame>::new(extended, &[0; 8]).is_none());
    }
}
