//! CAN-FD to UDP bridge protocol.
//!
//! Translates between addressed CAN-FD frames on a single bus segment and
//! fixed-size UDP datagrams exchanged with one remote controller.

#![cfg_attr(not(test), no_std)]

pub mod drain;
pub mod error;
pub mod frame;
pub mod liveness;
pub mod packet;
pub mod session;
pub mod translate;

pub use error::Error;

use core::net::Ipv4Addr;

/// Maximum application payload carried by one message.
pub const MAX_DATA_LEN: usize = 60;

/// Length of the control word at the start of every CAN-FD payload.
pub const CONTROL_WORD_LEN: usize = 4;

/// Maximum CAN-FD payload length.
pub const FD_MAX_LEN: usize = 64;

/// Wire packet length on UDP.
pub const PACKET_LEN: usize = 2 + 2 + 2 + MAX_DATA_LEN;

/// Port the gateway listens on.
pub const LISTEN_PORT: u16 = 8888;

/// Port the remote controller listens on.
pub const DESTINATION_PORT: u16 = 25565;

/// Destination used until a discovery message is received.
pub const DEFAULT_DESTINATION: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 4);

/// Scheduler ticks between two liveness probes.
pub const LIVENESS_PERIOD: u32 = 10_000;

/// Address value marking a discovery message.
pub const DISCOVERY_SENTINEL: u16 = 0xFFFF;

/// Address value marking a liveness probe.
pub const LIVENESS_SENTINEL: u16 = 0xFF;

/// Logical bus address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Highest valid address.
    pub const MAX: u8 = 0x1F;

    /// Keep the low 5 bits of a wire value.
    pub const fn truncate(value: u16) -> Address {
        Address((value & Self::MAX as u16) as u8)
    }
}

impl TryFrom<u8> for Address {
    type Error = Error;

    /// Try create an [`Address`] from a [`u8`] returning an error if the input is higher than `0x1F`.
    fn try_from(value: u8) -> Result<Address, Self::Error> {
        if value > Self::MAX {
            Err(Error::InvalidAddress(value))
        } else {
            Ok(Address(value))
        }
    }
}

impl From<Address> for u8 {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl From<Address> for u16 {
    fn from(value: Address) -> Self {
        value.0 as u16
    }
}

/// Scheduler iterations spent servicing bus events per tick.
pub const DRAIN_LIMIT: usize = 1_000;

// every type logged by the gateway must be loggable
#[cfg(feature = "defmt-03")]
const _: fn() = || {
    fn format<T: defmt::Format>() {}

    format::<Address>();
    format::<Error>();
    format::<frame::FdFrame>();
    format::<frame::IdFlags>();
    format::<liveness::Liveness>();
    format::<translate::Inbound>();
};

/// Clamp a declared payload length into `1..=MAX_DATA_LEN`.
pub(crate) fn clamp_len(len: usize) -> usize {
    len.clamp(1, MAX_DATA_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address() {
        assert!(Address::try_from(0).is_ok());
        assert!(Address::try_from(31).is_ok());
        assert!(Address::try_from(32).is_err());
        assert!(Address::try_from(255).is_err());
    }

    #[test]
    fn address_truncate() {
        assert_eq!(u8::from(Address::truncate(0x0041)), 0x01);
        assert_eq!(u8::from(Address::truncate(0xFFFF)), 0x1F);
        assert_eq!(u8::from(Address::truncate(17)), 17);
    }

    #[test]
    fn packet_len() {
        assert_eq!(PACKET_LEN, 66);
    }

    #[test]
    fn clamp() {
        assert_eq!(clamp_len(0), 1);
        assert_eq!(clamp_len(5), 5);
        assert_eq!(clamp_len(60), 60);
        assert_eq!(clamp_len(63), 60);
    }
}
