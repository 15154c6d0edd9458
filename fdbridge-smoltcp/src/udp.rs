//! UDP gateway.

use crate::{ip_address, ipv4_addr};
use core::net::Ipv4Addr;
use embedded_can::{blocking::Can, Frame as CanFrame};
use fdbridge::{
    drain::{drain_events, EventQueue},
    liveness::Liveness,
    packet::WirePacket,
    session::Session,
    translate::{self, Inbound},
    DESTINATION_PORT, DRAIN_LIMIT, LISTEN_PORT,
};
use smoltcp::{
    iface::{SocketHandle, SocketSet},
    phy::PacketMeta,
    socket::udp::{BindError, PacketBuffer, SendError, Socket, UdpMetadata},
    wire::IpEndpoint,
};
use zerocopy::AsBytes;

/// Gateway instance.
#[derive(Debug)]
pub struct Server<'s> {
    // configuration
    handle: SocketHandle,
    session: &'s Session,

    // state
    liveness: Liveness,
}

impl<'s> Server<'s> {
    /// Creates a new [`Server`] instance listening on [`LISTEN_PORT`].
    ///
    /// `liveness_period` is counted in calls to [`Server::poll`].
    pub fn new<'a>(
        sockets: &mut SocketSet<'a>,
        rx_buffer: PacketBuffer<'a>,
        tx_buffer: PacketBuffer<'a>,
        session: &'s Session,
        liveness_period: u32,
    ) -> Result<Server<'s>, BindError> {
        let mut socket = Socket::new(rx_buffer, tx_buffer);
        socket.bind(LISTEN_PORT)?;
        let handle = sockets.add(socket);

        Ok(Server {
            handle,
            session,
            liveness: Liveness::new(liveness_period),
        })
    }

    /// Shared routing state.
    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Run one scheduler tick.
    ///
    /// Sends the liveness probe when due, forwards every pending datagram
    /// to `bus`, then services the bus event queue for at most
    /// [`DRAIN_LIMIT`] iterations. Failures are logged and dropped.
    pub fn poll<C: Can + EventQueue>(
        &mut self,
        sockets: &mut SocketSet,
        bus: &mut C,
    ) {
        let socket = sockets.get_mut::<Socket>(self.handle);

        if self.liveness.tick() {
            if let Err(_err) = self.write_liveness(socket) {
                #[cfg(feature = "defmt-03")]
                defmt::error!("Failed to send liveness probe: {}", _err);
            }
        }

        while let Ok((payload, meta)) = socket.recv() {
            // copied out so nothing from a previous datagram survives
            let packet = match WirePacket::decode(payload) {
                Ok(packet) => packet,
                Err(_err) => {
                    #[cfg(feature = "defmt-03")]
                    defmt::warn!("Discarding datagram: {}", _err);
                    continue;
                }
            };

            let Some(source) = ipv4_addr(meta.endpoint.addr) else {
                continue;
            };

            if let Inbound::Forward(frame) =
                translate::inbound(&packet, source, self.session)
            {
                match <C::Frame as CanFrame>::new(frame.id(), frame.data()) {
                    Some(frame) => {
                        if let Err(_err) = bus.transmit(&frame) {
                            #[cfg(feature = "defmt-03")]
                            defmt::error!(
                                "Failed to transmit frame: {}",
                                defmt::Debug2Format(&_err)
                            );
                        }
                    }
                    None => {
                        #[cfg(feature = "defmt-03")]
                        defmt::error!("Bus cannot carry frame {}", frame);
                    }
                }
            }
        }

        if let Err(_err) = drain_events(bus, DRAIN_LIMIT) {
            #[cfg(feature = "defmt-03")]
            defmt::error!("Bus events not serviced: {}", _err);
        }
    }

    /// Send a liveness probe to the current destination.
    ///
    /// Note: this doesn't reset the liveness cadence.
    pub fn send_liveness(
        &mut self,
        sockets: &mut SocketSet,
    ) -> Result<(), SendError> {
        let socket = sockets.get_mut::<Socket>(self.handle);

        self.write_liveness(socket)
    }

    fn write_liveness(&self, socket: &mut Socket) -> Result<(), SendError> {
        let packet = WirePacket::liveness();

        socket.send_slice(
            packet.as_bytes(),
            metadata(self.session.destination()),
        )
    }

    /// Forward a frame received from the bus to the current destination.
    pub fn send_frame(
        &mut self,
        sockets: &mut SocketSet,
        frame: &impl CanFrame,
    ) -> Result<(), SendError> {
        let socket = sockets.get_mut::<Socket>(self.handle);

        let (packet, destination) = translate::outbound(frame, self.session);

        socket.send_slice(packet.as_bytes(), metadata(destination))
    }

    /// Register a waker for receive operations.
    ///
    /// See [smoltcp documentation](https://docs.rs/smoltcp/latest/smoltcp/socket/udp/struct.Socket.html#method.register_recv_waker)
    /// for the rules around receive wakers.
    #[cfg(feature = "async")]
    pub fn register_recv_waker(
        &mut self,
        sockets: &mut SocketSet,
        waker: &core::task::Waker,
    ) {
        let socket = sockets.get_mut::<Socket>(self.handle);

        socket.register_recv_waker(waker);
    }

    /// Register a waker for send operations.
    ///
    /// See [smoltcp documentation](https://docs.rs/smoltcp/latest/smoltcp/socket/udp/struct.Socket.html#method.register_send_waker)
    /// for the rules around send wakers.
    #[cfg(feature = "async")]
    pub fn register_send_waker(
        &mut self,
        sockets: &mut SocketSet,
        waker: &core::task::Waker,
    ) {
        let socket = sockets.get_mut::<Socket>(self.handle);

        socket.register_send_waker(waker);
    }
}

fn metadata(destination: Ipv4Addr) -> UdpMetadata {
    UdpMetadata {
        endpoint: IpEndpoint {
            addr: ip_address(destination),
            port: DESTINATION_PORT,
        },
        meta: PacketMeta::default(),
    }
}
