//! Protocol errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error {
    /// Datagram length differs from the wire packet length.
    #[error("malformed packet: expected 66 bytes, got {len}")]
    MalformedPacket { len: usize },

    /// Value does not fit in a 5-bit logical address.
    #[error("invalid address: {0}")]
    InvalidAddress(u8),

    /// Event queue still busy after the iteration limit.
    #[error("event queue not drained after {limit} iterations")]
    DrainLimit { limit: usize },
}
