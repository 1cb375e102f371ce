use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PhyIndex;
use crate::utils::consts::*;

/// Tuning parameters of one PHY. Applied on the next selection of that PHY.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhyParameterSet {
    /// Carrier frequency in Hz (direct mode)
    pub rx_frequency: f64,
    pub tx_frequency: f64,
    /// Gain in dB
    pub rx_gain: f64,
    pub tx_gain: f64,
    /// Samples per second, shared by the rx and tx path
    pub sample_rate: f64,
    /// RF center frequency in Hz (center+offset mode)
    pub center_frequency: f64,
    /// Baseband offset from the center frequency in Hz
    pub rx_frequency_offset: f64,
    pub tx_frequency_offset: f64,
}

impl PhyParameterSet {
    pub fn default_for(phy: PhyIndex) -> Self {
        let i = phy.as_usize();
        Self {
            rx_frequency: DEFAULT_RX_FREQUENCY[i],
            tx_frequency: DEFAULT_TX_FREQUENCY[i],
            rx_gain: DEFAULT_RX_GAIN[i],
            tx_gain: DEFAULT_TX_GAIN[i],
            sample_rate: DEFAULT_SAMPLE_RATE[i],
            center_frequency: DEFAULT_CENTER_FREQUENCY[i],
            rx_frequency_offset: DEFAULT_RX_FREQUENCY_OFFSET[i],
            tx_frequency_offset: DEFAULT_TX_FREQUENCY_OFFSET[i],
        }
    }
}

/// Addressable scalar field of a [`PhyParameterSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhyField {
    RxFrequency,
    TxFrequency,
    RxGain,
    TxGain,
    SampleRate,
    CenterFrequency,
    RxFrequencyOffset,
    TxFrequencyOffset,
}

impl PhyField {
    pub const ALL: [PhyField; 8] = [
        PhyField::RxFrequency,
        PhyField::TxFrequency,
        PhyField::RxGain,
        PhyField::TxGain,
        PhyField::SampleRate,
        PhyField::CenterFrequency,
        PhyField::RxFrequencyOffset,
        PhyField::TxFrequencyOffset,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PhyField::RxFrequency => "rx-frequency",
            PhyField::TxFrequency => "tx-frequency",
            PhyField::RxGain => "rx-gain",
            PhyField::TxGain => "tx-gain",
            PhyField::SampleRate => "sample-rate",
            PhyField::CenterFrequency => "center-frequency",
            PhyField::RxFrequencyOffset => "rx-frequency-offset",
            PhyField::TxFrequencyOffset => "tx-frequency-offset",
        }
    }

    pub fn get(&self, set: &PhyParameterSet) -> f64 {
        match self {
            PhyField::RxFrequency => set.rx_frequency,
            PhyField::TxFrequency => set.tx_frequency,
            PhyField::RxGain => set.rx_gain,
            PhyField::TxGain => set.tx_gain,
            PhyField::SampleRate => set.sample_rate,
            PhyField::CenterFrequency => set.center_frequency,
            PhyField::RxFrequencyOffset => set.rx_frequency_offset,
            PhyField::TxFrequencyOffset => set.tx_frequency_offset,
        }
    }

    pub fn set(&self, set: &mut PhyParameterSet, value: f64) {
        let slot = match self {
            PhyField::RxFrequency => &mut set.rx_frequency,
            PhyField::TxFrequency => &mut set.tx_frequency,
            PhyField::RxGain => &mut set.rx_gain,
            PhyField::TxGain => &mut set.tx_gain,
            PhyField::SampleRate => &mut set.sample_rate,
            PhyField::CenterFrequency => &mut set.center_frequency,
            PhyField::RxFrequencyOffset => &mut set.rx_frequency_offset,
            PhyField::TxFrequencyOffset => &mut set.tx_frequency_offset,
        };
        *slot = value;
    }
}

impl fmt::Display for PhyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhyField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('_', "-").to_ascii_lowercase();
        PhyField::ALL
            .into_iter()
            .find(|f| f.name() == normalized)
            .ok_or_else(|| format!("unknown PHY parameter '{}'", s))
    }
}

/// Receiver/transmitter channel pair of the RF frontend.
///
/// Stored once and shared by both PHYs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMapping {
    pub rx: u32,
    pub tx: u32,
}

impl Default for ChannelMapping {
    fn default() -> Self {
        Self {
            rx: DEFAULT_RX_CHANNEL,
            tx: DEFAULT_TX_CHANNEL,
        }
    }
}

/// The fixed pair of PHY parameter sets
#[derive(Debug, Clone, PartialEq)]
pub struct PhyTable {
    sets: [PhyParameterSet; 2],
}

impl PhyTable {
    pub fn new(phy0: PhyParameterSet, phy1: PhyParameterSet) -> Self {
        Self { sets: [phy0, phy1] }
    }

    pub fn get(&self, phy: PhyIndex) -> &PhyParameterSet {
        &self.sets[phy.as_usize()]
    }

    pub fn get_mut(&mut self, phy: PhyIndex) -> &mut PhyParameterSet {
        &mut self.sets[phy.as_usize()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhyIndex, &PhyParameterSet)> {
        PhyIndex::ALL
            .into_iter()
            .map(move |phy| (phy, self.get(phy)))
    }
}

impl Default for PhyTable {
    fn default() -> Self {
        Self::new(
            PhyParameterSet::default_for(PhyIndex::Phy0),
            PhyParameterSet::default_for(PhyIndex::Phy1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = PhyTable::default();
        let phy0 = table.get(PhyIndex::Phy0);
        let phy1 = table.get(PhyIndex::Phy1);
        assert_eq!(phy0.center_frequency, 5.1e9);
        assert_eq!(phy1.center_frequency, 2.45e9);
        assert_eq!(phy0.rx_gain, 60.0);
        assert_eq!(phy1.rx_gain, 50.0);
        assert_eq!(phy1.rx_frequency, 2480e6);
    }

    #[test]
    fn test_get_mut_isolated() {
        let mut table = PhyTable::default();
        let before = *table.get(PhyIndex::Phy1);
        table.get_mut(PhyIndex::Phy0).tx_gain = 12.0;
        assert_eq!(table.get(PhyIndex::Phy0).tx_gain, 12.0);
        assert_eq!(*table.get(PhyIndex::Phy1), before);
    }

    #[test]
    fn test_field_access() {
        let mut set = PhyParameterSet::default_for(PhyIndex::Phy0);
        for (i, field) in PhyField::ALL.iter().enumerate() {
            field.set(&mut set, i as f64 + 0.5);
        }
        for (i, field) in PhyField::ALL.iter().enumerate() {
            assert_eq!(field.get(&set), i as f64 + 0.5);
        }
        assert_eq!(set.sample_rate, 4.5);
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("rx-gain".parse::<PhyField>().unwrap(), PhyField::RxGain);
        assert_eq!(
            "center_frequency".parse::<PhyField>().unwrap(),
            PhyField::CenterFrequency
        );
        assert!("bandwidth".parse::<PhyField>().is_err());
    }
}
