//! PHY controller
//!
//! Owns the two PHY parameter sets, the active-PHY pointer and the tuning
//! mode, and turns a PHY selection into an ordered batch of remote calls.
//! Parameter setters only touch local state; nothing reaches the flowgraph
//! until [`PhyController::select`] or [`PhyController::switch`] runs.
//!
//! Every mutating operation takes `&mut self`: one owner drives the
//! controller at a time. Share it across threads through
//! [`worker::ControllerWorker`] or an external lock.

pub mod state;
pub mod worker;

pub use state::ControllerState;
pub use worker::{ControllerHandle, ControllerWorker};

use tracing::{debug, info};

use crate::directory::{self, BlockRole, FlowgraphDescription, Resolution, RoleMatcher};
use crate::error::{ControllerError, ControllerResult};
use crate::phy::{ChannelMapping, PhyField, PhyIndex, PhyParameterSet, PhyTable, TuningMode};
use crate::transport::Transport;
use crate::wire::{CallPayload, EndpointTable, RemoteCall, RemoteOp};

pub struct PhyController<T: Transport> {
    transport: T,
    base_url: String,
    endpoints: EndpointTable,
    missing: Vec<BlockRole>,
    state: ControllerState,
}

impl<T: Transport> PhyController<T> {
    /// Discover the flowgraph at `base_url` and build the endpoint table.
    ///
    /// Roles that cannot be found are logged and remembered; calls addressed
    /// to them fail later with `TransportFailure`.
    pub fn connect(
        mut transport: T,
        base_url: &str,
        matchers: &[RoleMatcher],
    ) -> ControllerResult<(Self, FlowgraphDescription)> {
        let (description, resolution) = directory::discover(&mut transport, base_url, matchers)?;
        info!(
            "Discovered {} blocks, {}/{} roles resolved",
            description.blocks.len(),
            BlockRole::ALL.len() - resolution.missing().len(),
            BlockRole::ALL.len()
        );
        Ok((Self::with_resolution(transport, base_url, &resolution), description))
    }

    /// Build a controller from an existing role resolution
    pub fn with_resolution(transport: T, base_url: &str, resolution: &Resolution) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
            endpoints: EndpointTable::build(base_url, resolution),
            missing: resolution.missing().to_vec(),
            state: ControllerState::default(),
        }
    }

    // ------------------------------------------------------------------
    // Deferred configuration, applied on the next PHY selection
    // ------------------------------------------------------------------

    /// Set one field of `phy`'s parameter set. No remote call is made.
    pub fn set_field(&mut self, phy: usize, field: PhyField, value: f64) -> ControllerResult<()> {
        let params = self.state.params_mut(phy)?;
        field.set(params, value);
        debug!("PHY {} {} = {} (pending)", phy, field, value);
        Ok(())
    }

    pub fn set_rx_frequency(&mut self, phy: usize, frequency: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::RxFrequency, frequency)
    }

    pub fn set_tx_frequency(&mut self, phy: usize, frequency: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::TxFrequency, frequency)
    }

    pub fn set_rx_gain(&mut self, phy: usize, gain: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::RxGain, gain)
    }

    pub fn set_tx_gain(&mut self, phy: usize, gain: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::TxGain, gain)
    }

    pub fn set_sample_rate(&mut self, phy: usize, sample_rate: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::SampleRate, sample_rate)
    }

    pub fn set_center_frequency(&mut self, phy: usize, frequency: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::CenterFrequency, frequency)
    }

    pub fn set_rx_frequency_offset(&mut self, phy: usize, offset: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::RxFrequencyOffset, offset)
    }

    pub fn set_tx_frequency_offset(&mut self, phy: usize, offset: f64) -> ControllerResult<()> {
        self.set_field(phy, PhyField::TxFrequencyOffset, offset)
    }

    /// Receiver/transmitter channel, shared by both PHYs
    pub fn set_channels(&mut self, receiver: u32, transmitter: u32) {
        self.state.channels = ChannelMapping {
            rx: receiver,
            tx: transmitter,
        };
    }

    pub fn set_tuning_mode(&mut self, mode: TuningMode) {
        self.state.tuning_mode = mode;
    }

    /// Replace the whole parameter table, channel mapping and tuning mode
    pub fn configure(&mut self, phys: PhyTable, channels: ChannelMapping, mode: TuningMode) {
        self.state.phys = phys;
        self.state.channels = channels;
        self.state.tuning_mode = mode;
    }

    // ------------------------------------------------------------------
    // PHY selection
    // ------------------------------------------------------------------

    /// Put `phy` on air and make it the active PHY
    pub fn select(&mut self, phy: usize) -> ControllerResult<()> {
        let target = PhyIndex::try_from(phy)?;
        self.select_phy(target)
    }

    pub fn select_phy(&mut self, target: PhyIndex) -> ControllerResult<()> {
        self.apply(target)?;
        self.state.active_phy = target;
        Ok(())
    }

    /// Toggle to the other PHY; returns the new active PHY
    pub fn switch(&mut self) -> ControllerResult<PhyIndex> {
        let target = self.state.active_phy.other();
        self.select_phy(target)?;
        Ok(target)
    }

    /// The calls `select_phy(target)` would issue, in order
    pub fn plan(&self, target: PhyIndex) -> Vec<RemoteCall> {
        self.state.apply_plan(target)
    }

    fn apply(&mut self, target: PhyIndex) -> ControllerResult<()> {
        let plan = self.state.apply_plan(target);
        info!(
            "Applying {} ({} mode, {} calls)",
            target,
            self.state.tuning_mode,
            plan.len()
        );
        for call in &plan {
            self.issue(call)?;
        }
        info!("{} active", target);
        Ok(())
    }

    fn issue(&mut self, call: &RemoteCall) -> ControllerResult<()> {
        let failure = |source| ControllerError::TransportFailure {
            op: call.op,
            source,
        };
        let url = self.endpoints.url(call.op).map_err(failure)?;
        debug!("{} <- {}", call.op, call.payload);
        self.transport.call(url, call).map_err(failure)
    }

    // ------------------------------------------------------------------
    // Immediate frontend calls, bypassing the parameter table
    // ------------------------------------------------------------------

    fn send_now(&mut self, op: RemoteOp, payload: CallPayload) -> ControllerResult<()> {
        self.issue(&RemoteCall::new(op, payload))
    }

    pub fn send_rx_frequency(&mut self, frequency: f64) -> ControllerResult<()> {
        self.send_now(RemoteOp::RfSourceFrequency, CallPayload::f64(frequency))
    }

    pub fn send_tx_frequency(&mut self, frequency: f64) -> ControllerResult<()> {
        self.send_now(RemoteOp::RfSinkFrequency, CallPayload::f64(frequency))
    }

    pub fn send_rx_gain(&mut self, gain: f64) -> ControllerResult<()> {
        self.send_now(RemoteOp::RfSourceGain, CallPayload::f64(gain))
    }

    pub fn send_tx_gain(&mut self, gain: f64) -> ControllerResult<()> {
        self.send_now(RemoteOp::RfSinkGain, CallPayload::f64(gain))
    }

    pub fn send_rx_sample_rate(&mut self, sample_rate: f64) -> ControllerResult<()> {
        self.send_now(RemoteOp::RfSourceSampleRate, CallPayload::f64(sample_rate))
    }

    pub fn send_tx_sample_rate(&mut self, sample_rate: f64) -> ControllerResult<()> {
        self.send_now(RemoteOp::RfSinkSampleRate, CallPayload::f64(sample_rate))
    }

    pub fn send_rx_center_frequency(&mut self, frequency: f64, channel: u32) -> ControllerResult<()> {
        self.send_now(
            RemoteOp::RfSourceCenterFrequency,
            CallPayload::with_channel(frequency, channel),
        )
    }

    pub fn send_tx_center_frequency(&mut self, frequency: f64, channel: u32) -> ControllerResult<()> {
        self.send_now(
            RemoteOp::RfSinkCenterFrequency,
            CallPayload::with_channel(frequency, channel),
        )
    }

    pub fn send_rx_frequency_offset(&mut self, offset: f64, channel: u32) -> ControllerResult<()> {
        self.send_now(
            RemoteOp::RfSourceFrequencyOffset,
            CallPayload::with_channel(offset, channel),
        )
    }

    pub fn send_tx_frequency_offset(&mut self, offset: f64, channel: u32) -> ControllerResult<()> {
        self.send_now(
            RemoteOp::RfSinkFrequencyOffset,
            CallPayload::with_channel(offset, channel),
        )
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn active_phy(&self) -> PhyIndex {
        self.state.active_phy
    }

    pub fn tuning_mode(&self) -> TuningMode {
        self.state.tuning_mode
    }

    pub fn channels(&self) -> ChannelMapping {
        self.state.channels
    }

    pub fn phy(&self, phy: usize) -> ControllerResult<&PhyParameterSet> {
        let phy = PhyIndex::try_from(phy)?;
        Ok(self.state.phys.get(phy))
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Roles that were not found during discovery
    pub fn missing_roles(&self) -> &[BlockRole] {
        &self.missing
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
