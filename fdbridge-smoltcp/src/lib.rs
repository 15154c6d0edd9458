//! smoltcp driver for the CAN-FD to UDP bridge.
//!
//! This crate provides the gateway server binding a UDP socket to any
//! `embedded-can` bus.

#![no_std]

pub mod udp;

// re-export
pub use fdbridge as proto;

use core::net::Ipv4Addr;
use smoltcp::wire::IpAddress;

// conversion between different library types

pub(crate) const fn ip_address(addr: Ipv4Addr) -> IpAddress {
    let octets = addr.octets();
    IpAddress::v4(octets[0], octets[1], octets[2], octets[3])
}

pub(crate) fn ipv4_addr(addr: IpAddress) -> Option<Ipv4Addr> {
    #[allow(unreachable_patterns)]
    match addr {
        IpAddress::Ipv4(addr) => Some(Ipv4Addr::from(addr.0)),
        _ => None,
    }
}
