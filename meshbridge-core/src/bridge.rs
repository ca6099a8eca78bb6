//! Bridge control loop
//!
//! Ties the mesh node, the slave link and the status LED together. The
//! board's main loop calls [`Bridge::serial_poll`] whenever the UART has
//! data and [`Bridge::exec`] once per iteration; neither ever blocks.
//!
//! A mesh message whose first 13 bytes form a valid frame becomes a
//! command for slave `frame[6]` with command code `frame[8]`. Reports from
//! the slave stay on this node: they are returned from [`Bridge::exec`]
//! and kept as [`Bridge::last_report`]. A report frame with status 0 is
//! byte-identical to a stop command, so relaying reports would make every
//! peer stop its own slave.

use meshbridge_hal::{Clock, MeshTransport, NodeId, OutputPin, UartRx, UartTx};
use meshbridge_protocol::{
    Frame, FrameError, MotorState, ParserStats, SlaveCommand, SlaveReport, FRAME_LEN,
    RX_QUEUE_CAPACITY,
};

use crate::config::NodeConfig;
use crate::indicator::StatusIndicator;
use crate::link::{LinkStats, SlaveLink};
use crate::mesh::{MeshHandler, MeshNode};

/// Slave command requested over the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveRequest {
    /// Node that sent the request
    pub from: NodeId,
    /// Target slave address
    pub address: u8,
    /// Command to execute
    pub command: SlaveCommand,
}

/// Mesh handler turning request frames into pending slave commands
///
/// Only the newest request is kept; one that arrives before the previous
/// one was sent replaces it.
#[derive(Debug, Default)]
pub struct RequestRelay {
    pending: Option<SlaveRequest>,
    accepted: u32,
    rejected: u32,
}

impl RequestRelay {
    /// Create an empty relay
    pub const fn new() -> Self {
        Self {
            pending: None,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Take the pending request, if any
    pub fn take(&mut self) -> Option<SlaveRequest> {
        self.pending.take()
    }

    /// Peek at the pending request
    pub fn pending(&self) -> Option<&SlaveRequest> {
        self.pending.as_ref()
    }

    /// Requests accepted so far
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Messages of frame length that failed validation
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

impl MeshHandler for RequestRelay {
    fn on_receive(&mut self, from: NodeId, payload: &[u8]) {
        // Heartbeats, greetings and other short texts
        if payload.len() < FRAME_LEN {
            return;
        }

        match Frame::from_bytes(payload) {
            Ok(frame) => {
                let request = SlaveRequest {
                    from,
                    address: frame.address(),
                    command: SlaveCommand::from_byte(frame.command_code()),
                };

                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "Request from {}: slave {=u8:#x} command {}",
                    from,
                    request.address,
                    request.command
                );

                self.pending = Some(request);
                self.accepted = self.accepted.wrapping_add(1);
            }
            Err(FrameError::InvalidChecksum) | Err(FrameError::Truncated) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Ignoring {} byte message from {}", payload.len(), from);
                self.rejected = self.rejected.wrapping_add(1);
            }
        }
    }
}

/// The bridge node
pub struct Bridge<M, Rx, Tx, P, const N: usize = RX_QUEUE_CAPACITY> {
    config: NodeConfig,
    mesh: MeshNode<M>,
    link: SlaveLink<Rx, Tx, N>,
    led: StatusIndicator<P>,
    relay: RequestRelay,
}

impl<M, Rx, Tx, P, const N: usize> Bridge<M, Rx, Tx, P, N>
where
    M: MeshTransport,
    Rx: UartRx,
    Tx: UartTx,
    P: OutputPin,
{
    /// Assemble a bridge from its parts
    ///
    /// The UART must already be configured per [`NodeConfig::uart_config`].
    pub fn new(config: NodeConfig, mesh: M, rx: Rx, tx: Tx, led: P) -> Self {
        let mesh = MeshNode::new(mesh)
            .with_heartbeat(config.heartbeat_interval_ms)
            .with_status_check(config.status_interval_ms);
        let link = SlaveLink::with_policy(rx, tx, config.resync_policy);
        let led =
            StatusIndicator::with_intervals(led, config.blink_connected_ms, config.blink_disconnected_ms);

        Self {
            config,
            mesh,
            link,
            led,
            relay: RequestRelay::new(),
        }
    }

    /// Bring up the LED, the mesh and the slave link
    pub fn begin(&mut self, now_ms: u32) {
        self.led.init();
        self.mesh.begin(&self.config.mesh_config(), now_ms);
        self.link.reset();

        #[cfg(feature = "defmt")]
        defmt::info!("Bridge up, slave link at {} baud", self.config.baudrate);
    }

    /// Serial event hook: move received UART bytes into the queue
    pub fn serial_poll(&mut self) -> Result<usize, Rx::Error> {
        self.link.receive()
    }

    /// Run one control cycle
    ///
    /// Updates the mesh, blinks the LED, forwards the pending mesh request
    /// to the slave and runs one drain cycle over the slave queue. Returns
    /// the slave report found in this cycle, if any.
    ///
    /// On a transmit error the pending request is dropped and the queue is
    /// left untouched, so a waiting report is returned by the next cycle.
    pub fn exec(&mut self, now_ms: u32) -> Result<Option<SlaveReport>, Tx::Error> {
        self.mesh.update(now_ms, &mut self.relay);

        let connected = self.mesh.is_connected();
        self.led.update(now_ms, connected);

        if let Some(request) = self.relay.take() {
            self.link.send(request.address, request.command)?;
        }

        Ok(self.link.poll())
    }

    /// Run one control cycle at the clock's current time
    pub fn tick<C: Clock>(&mut self, clock: &C) -> Result<Option<SlaveReport>, Tx::Error> {
        self.exec(clock.now_ms())
    }

    /// Most recent valid report from the slave
    pub fn last_report(&self) -> Option<SlaveReport> {
        self.link.last_report()
    }

    /// Motor state from the most recent report, if it was a known code
    pub fn motor_state(&self) -> Option<MotorState> {
        self.link.last_report()?.motor_state()
    }

    /// Slave frame parser counters
    pub fn parser_stats(&self) -> ParserStats {
        self.link.parser_stats()
    }

    /// Slave link counters
    pub fn link_stats(&self) -> LinkStats {
        self.link.stats()
    }

    /// Active configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Get access to the mesh node
    pub fn mesh(&self) -> &MeshNode<M> {
        &self.mesh
    }

    /// Get mutable access to the mesh node
    pub fn mesh_mut(&mut self) -> &mut MeshNode<M> {
        &mut self.mesh
    }

    /// Get access to the slave link
    pub fn link(&self) -> &SlaveLink<Rx, Tx, N> {
        &self.link
    }

    /// Get mutable access to the slave link
    pub fn link_mut(&mut self) -> &mut SlaveLink<Rx, Tx, N> {
        &mut self.link
    }

    /// Get access to the status LED
    pub fn indicator(&self) -> &StatusIndicator<P> {
        &self.led
    }

    /// Get access to the mesh request relay
    pub fn relay(&self) -> &RequestRelay {
        &self.relay
    }
}
