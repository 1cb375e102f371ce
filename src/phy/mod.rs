// PHY parameter model: the two waveform configurations and how they are tuned

pub mod params;

pub use params::{ChannelMapping, PhyField, PhyParameterSet, PhyTable};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ControllerError;

/// Which of the two waveforms is referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhyIndex {
    Phy0 = 0,
    Phy1 = 1,
}

impl PhyIndex {
    pub const ALL: [PhyIndex; 2] = [PhyIndex::Phy0, PhyIndex::Phy1];

    /// The complementary PHY
    pub fn other(self) -> Self {
        match self {
            PhyIndex::Phy0 => PhyIndex::Phy1,
            PhyIndex::Phy1 => PhyIndex::Phy0,
        }
    }

    pub fn as_usize(self) -> usize {
        self as usize
    }

    /// Value written to the selector blocks
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<usize> for PhyIndex {
    type Error = ControllerError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PhyIndex::Phy0),
            1 => Ok(PhyIndex::Phy1),
            other => Err(ControllerError::InvalidIndex(other)),
        }
    }
}

impl fmt::Display for PhyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PHY {}", self.as_usize())
    }
}

/// How the RF frontend is retuned on PHY selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningMode {
    /// Retune the carrier directly to rx/tx frequency
    Direct,
    /// Tune to the center frequency and shift digitally by the offsets
    #[default]
    CenterOffset,
}

impl TuningMode {
    pub fn name(&self) -> &'static str {
        match self {
            TuningMode::Direct => "direct",
            TuningMode::CenterOffset => "center+offset",
        }
    }
}

impl fmt::Display for TuningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phy_index_conversion() {
        assert_eq!(PhyIndex::try_from(0).unwrap(), PhyIndex::Phy0);
        assert_eq!(PhyIndex::try_from(1).unwrap(), PhyIndex::Phy1);
        assert!(matches!(
            PhyIndex::try_from(2),
            Err(ControllerError::InvalidIndex(2))
        ));
    }

    #[test]
    fn test_phy_index_toggle() {
        assert_eq!(PhyIndex::Phy0.other(), PhyIndex::Phy1);
        assert_eq!(PhyIndex::Phy1.other(), PhyIndex::Phy0);
        assert_eq!(PhyIndex::Phy1.other().other(), PhyIndex::Phy1);
    }

    #[test]
    fn test_tuning_mode_serde_names() {
        let mode: TuningMode = serde_json::from_str("\"direct\"").unwrap();
        assert_eq!(mode, TuningMode::Direct);
        let mode: TuningMode = serde_json::from_str("\"center_offset\"").unwrap();
        assert_eq!(mode, TuningMode::CenterOffset);
        assert_eq!(TuningMode::default(), TuningMode::CenterOffset);
    }
}
