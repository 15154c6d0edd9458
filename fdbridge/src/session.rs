//! Routing state shared between the bus interrupt and the scheduler loop.

use core::net::Ipv4Addr;
use core::sync::atomic::{AtomicU32, Ordering};

/// Currently known destination of outgoing packets.
///
/// Only the inbound translator changes it, on discovery. Both sides access
/// it through an atomic so a `static` instance may be read from an
/// interrupt handler.
#[derive(Debug)]
pub struct Session {
    destination: AtomicU32,
}

impl Session {
    pub const fn new(destination: Ipv4Addr) -> Self {
        Session {
            destination: AtomicU32::new(u32::from_be_bytes(
                destination.octets(),
            )),
        }
    }

    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.destination.load(Ordering::Acquire))
    }

    pub(crate) fn set_destination(&self, destination: Ipv4Addr) {
        self.destination
            .store(u32::from(destination), Ordering::Release);
    }
}

impl Default for Session {
    /// Start from [`DEFAULT_DESTINATION`](crate::DEFAULT_DESTINATION).
    fn default() -> Self {
        Session::new(crate::DEFAULT_DESTINATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_default() {
        let session = Session::default();
        assert_eq!(session.destination(), Ipv4Addr::new(10, 0, 0, 4));
    }

    #[test]
    fn destination_update() {
        static SESSION: Session = Session::new(Ipv4Addr::new(10, 0, 0, 4));

        SESSION.set_destination(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(SESSION.destination(), Ipv4Addr::new(192, 168, 1, 20));
    }
}
