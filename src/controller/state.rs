use crate::error::ControllerResult;
use crate::phy::{ChannelMapping, PhyIndex, PhyParameterSet, PhyTable, TuningMode};
use crate::wire::{CallPayload, RemoteCall, RemoteOp};

/// Everything the controller remembers between calls
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub active_phy: PhyIndex,
    pub tuning_mode: TuningMode,
    pub phys: PhyTable,
    pub channels: ChannelMapping,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            active_phy: PhyIndex::Phy0,
            tuning_mode: TuningMode::CenterOffset,
            phys: PhyTable::default(),
            channels: ChannelMapping::default(),
        }
    }
}

impl ControllerState {
    /// Parameter set of `phy`, validating the raw index first
    pub(crate) fn params_mut(&mut self, phy: usize) -> ControllerResult<&mut PhyParameterSet> {
        let phy = PhyIndex::try_from(phy)?;
        Ok(self.phys.get_mut(phy))
    }

    /// Ordered remote calls that put `target` on air.
    ///
    /// Routing (selectors) always comes first, then gain and sample rate of
    /// both RF blocks, then tuning according to the current mode.
    pub fn apply_plan(&self, target: PhyIndex) -> Vec<RemoteCall> {
        let p = self.phys.get(target);
        let index = target.as_u32();
        let ChannelMapping { rx, tx } = self.channels;

        let mut plan = vec![
            RemoteCall::new(RemoteOp::SourceSelectorIndex, CallPayload::u32(index)),
            RemoteCall::new(RemoteOp::SinkSelectorIndex, CallPayload::u32(index)),
            RemoteCall::new(RemoteOp::MessageSelectorIndex, CallPayload::u32(index)),
            RemoteCall::new(RemoteOp::RfSourceGain, CallPayload::f64(p.rx_gain)),
            RemoteCall::new(RemoteOp::RfSourceSampleRate, CallPayload::f64(p.sample_rate)),
            RemoteCall::new(RemoteOp::RfSinkGain, CallPayload::f64(p.tx_gain)),
            RemoteCall::new(RemoteOp::RfSinkSampleRate, CallPayload::f64(p.sample_rate)),
        ];

        match self.tuning_mode {
            TuningMode::CenterOffset => plan.extend([
                RemoteCall::new(
                    RemoteOp::RfSourceCenterFrequency,
                    CallPayload::with_channel(p.center_frequency, rx),
                ),
                RemoteCall::new(
                    RemoteOp::RfSinkCenterFrequency,
                    CallPayload::with_channel(p.center_frequency, tx),
                ),
                RemoteCall::new(
                    RemoteOp::RfSourceFrequencyOffset,
                    CallPayload::with_channel(p.rx_frequency_offset, rx),
                ),
                RemoteCall::new(
                    RemoteOp::RfSinkFrequencyOffset,
                    CallPayload::with_channel(p.tx_frequency_offset, tx),
                ),
            ]),
            TuningMode::Direct => plan.extend([
                RemoteCall::new(RemoteOp::RfSourceFrequency, CallPayload::f64(p.rx_frequency)),
                RemoteCall::new(RemoteOp::RfSinkFrequency, CallPayload::f64(p.tx_frequency)),
            ]),
        }

        plan
    }
}
