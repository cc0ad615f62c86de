//! Transport over a packet-radio transceiver

use tracing::{debug, info, trace};

use super::Transport;
use crate::types::{Address, LinkSession, RF_SETUP_REGISTER, Role, WireFrame};
use crate::{Error, LinkError, Result};

/// Pipe the receiver listens on for telemetry.
pub const RX_PIPE: u8 = 1;

/// Transceiver driver collaborator (nRF24L01-class).
///
/// Calls are expected to be non-blocking; no timeouts are placed on them.
pub trait RadioDriver: Send + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn set_channel(&mut self, channel: u8) -> std::result::Result<(), Self::Error>;

    fn set_payload_size(&mut self, size: u8) -> std::result::Result<(), Self::Error>;

    fn write_register(&mut self, register: u8, value: u8) -> std::result::Result<(), Self::Error>;

    fn open_tx_pipe(&mut self, address: &Address) -> std::result::Result<(), Self::Error>;

    fn open_rx_pipe(&mut self, pipe: u8, address: &Address) -> std::result::Result<(), Self::Error>;

    fn start_listening(&mut self) -> std::result::Result<(), Self::Error>;

    fn send(&mut self, payload: &[u8]) -> std::result::Result<(), Self::Error>;

    /// Whether a payload is waiting in the receive FIFO
    fn any(&mut self) -> bool;

    fn recv(&mut self) -> std::result::Result<Vec<u8>, Self::Error>;
}

/// Transport driving a configured transceiver.
///
/// Owns both the driver and the immutable session it was opened with.
pub struct Radio<D> {
    driver: D,
    session: LinkSession,
    role: Role,
}

impl<D: RadioDriver> Radio<D> {
    /// Apply `session` to the transceiver for the given role.
    ///
    /// Any failure here is a configuration error: the node cannot run
    /// without a working radio.
    pub fn open(mut driver: D, session: LinkSession, role: Role) -> Result<Self> {
        session.validate()?;

        let payload_size = u8::try_from(session.payload_size)
            .map_err(|_| Error::configuration("payload size does not fit the transceiver"))?;

        driver
            .set_payload_size(payload_size)
            .map_err(|e| setup_failed(format!("set payload size {payload_size}"), e))?;
        driver
            .set_channel(session.channel)
            .map_err(|e| setup_failed(format!("set channel {}", session.channel), e))?;

        let rf_setup = session.rf_setup();
        driver
            .write_register(RF_SETUP_REGISTER, rf_setup)
            .map_err(|e| setup_failed(format!("write RF_SETUP {rf_setup:#04x}"), e))?;
        debug!(
            "RF_SETUP {:#04x} ({:?}, {} dBm)",
            rf_setup,
            session.data_rate,
            session.power.dbm()
        );

        let local = session.local_address(role);
        driver.open_tx_pipe(&local).map_err(|e| setup_failed(format!("open TX pipe {local}"), e))?;

        if role == Role::Receiver {
            let peer = session.peer_address(role);
            driver
                .open_rx_pipe(RX_PIPE, &peer)
                .map_err(|e| setup_failed(format!("open RX pipe {RX_PIPE} {peer}"), e))?;
        }

        info!(channel = session.channel, ?role, "Radio configured");

        Ok(Self { driver, session, role })
    }

    pub fn session(&self) -> &LinkSession {
        &self.session
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Release the transceiver
    pub fn into_driver(self) -> D {
        self.driver
    }
}

fn setup_failed<E>(step: String, source: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::configuration_with_source(step, Box::new(source))
}

#[async_trait::async_trait]
impl<D: RadioDriver> Transport for Radio<D> {
    async fn send_one(&mut self, frame: &WireFrame) -> std::result::Result<(), LinkError> {
        trace!("TX {}", frame);
        self.driver.send(frame.as_bytes()).map_err(|e| LinkError::send("transceiver send", e))
    }

    fn poll_pending(&mut self) -> bool {
        self.driver.any()
    }

    async fn receive_one(&mut self) -> std::result::Result<Vec<u8>, LinkError> {
        let payload =
            self.driver.recv().map_err(|e| LinkError::receive("transceiver recv", e))?;
        trace!("RX {} bytes", payload.len());
        Ok(payload)
    }

    async fn enter_listen_mode(&mut self) -> std::result::Result<(), LinkError> {
        self.driver.start_listening().map_err(|e| LinkError::listen("start listening", e))?;
        debug!(channel = self.session.channel, "Listening");
        Ok(())
    }
}
