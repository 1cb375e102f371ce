use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::controller::{ControllerState, PhyController};
use crate::directory::{BlockRole, RoleMatcher};
use crate::error::{ControllerError, ControllerResult};
use crate::phy::{ChannelMapping, PhyIndex, PhyParameterSet, PhyTable, TuningMode};
use crate::transport::Transport;

/// Optional per-PHY values; anything left out keeps the built-in default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_frequency_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_frequency_offset: Option<f64>,
}

impl PhyOverrides {
    pub fn resolve(&self, phy: PhyIndex) -> PhyParameterSet {
        let d = PhyParameterSet::default_for(phy);
        PhyParameterSet {
            rx_frequency: self.rx_frequency.unwrap_or(d.rx_frequency),
            tx_frequency: self.tx_frequency.unwrap_or(d.tx_frequency),
            rx_gain: self.rx_gain.unwrap_or(d.rx_gain),
            tx_gain: self.tx_gain.unwrap_or(d.tx_gain),
            sample_rate: self.sample_rate.unwrap_or(d.sample_rate),
            center_frequency: self.center_frequency.unwrap_or(d.center_frequency),
            rx_frequency_offset: self.rx_frequency_offset.unwrap_or(d.rx_frequency_offset),
            tx_frequency_offset: self.tx_frequency_offset.unwrap_or(d.tx_frequency_offset),
        }
    }

    /// First field holding NaN or an infinity; JSON has no encoding for them
    fn non_finite(&self) -> Option<&'static str> {
        [
            ("rx_frequency", self.rx_frequency),
            ("tx_frequency", self.tx_frequency),
            ("rx_gain", self.rx_gain),
            ("tx_gain", self.tx_gain),
            ("sample_rate", self.sample_rate),
            ("center_frequency", self.center_frequency),
            ("rx_frequency_offset", self.rx_frequency_offset),
            ("tx_frequency_offset", self.tx_frequency_offset),
        ]
        .into_iter()
        .find(|(_, value)| value.is_some_and(|v| !v.is_finite()))
        .map(|(name, _)| name)
    }

    fn from_set(set: &PhyParameterSet) -> Self {
        Self {
            rx_frequency: Some(set.rx_frequency),
            tx_frequency: Some(set.tx_frequency),
            rx_gain: Some(set.rx_gain),
            tx_gain: Some(set.tx_gain),
            sample_rate: Some(set.sample_rate),
            center_frequency: Some(set.center_frequency),
            rx_frequency_offset: Some(set.rx_frequency_offset),
            tx_frequency_offset: Some(set.tx_frequency_offset),
        }
    }
}

/// Instance names used to recognise each block role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleNames {
    pub source_selector: String,
    pub sink_selector: String,
    pub message_selector: String,
    pub rf_source: String,
    pub rf_sink: String,
}

impl RoleNames {
    pub fn name_of(&self, role: BlockRole) -> &str {
        match role {
            BlockRole::SourceSelector => &self.source_selector,
            BlockRole::SinkSelector => &self.sink_selector,
            BlockRole::MessageSelector => &self.message_selector,
            BlockRole::RfSource => &self.rf_source,
            BlockRole::RfSink => &self.rf_sink,
        }
    }

    pub fn matchers(&self) -> Vec<RoleMatcher> {
        BlockRole::ALL
            .iter()
            .map(|role| RoleMatcher::instance_name(*role, self.name_of(*role)))
            .collect()
    }
}

impl Default for RoleNames {
    fn default() -> Self {
        Self {
            source_selector: BlockRole::SourceSelector.default_instance_name().to_string(),
            sink_selector: BlockRole::SinkSelector.default_instance_name().to_string(),
            message_selector: BlockRole::MessageSelector.default_instance_name().to_string(),
            rf_source: BlockRole::RfSource.default_instance_name().to_string(),
            rf_sink: BlockRole::RfSink.default_instance_name().to_string(),
        }
    }
}

/// Controller configuration loaded from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub tuning_mode: TuningMode,
    pub channels: ChannelMapping,
    pub phys: [PhyOverrides; 2],
    pub roles: RoleNames,
}

impl Profile {
    pub fn load(path: &Path) -> ControllerResult<Self> {
        let profile_error = |reason: String| ControllerError::Profile {
            path: path.display().to_string(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| profile_error(e.to_string()))?;
        Self::from_json_str(&text).map_err(profile_error)
    }

    pub fn from_json_str(text: &str) -> Result<Self, String> {
        let profile: Self = serde_json::from_str(text).map_err(|e| e.to_string())?;
        profile.check_finite()?;
        Ok(profile)
    }

    fn check_finite(&self) -> Result<(), String> {
        for (i, phys) in self.phys.iter().enumerate() {
            if let Some(field) = phys.non_finite() {
                return Err(format!("phys[{}].{} is not a finite number", i, field));
            }
        }
        Ok(())
    }

    /// Snapshot of a running configuration, every field filled in
    pub fn from_state(state: &ControllerState, roles: RoleNames) -> Self {
        Self {
            tuning_mode: state.tuning_mode,
            channels: state.channels,
            phys: [
                PhyOverrides::from_set(state.phys.get(PhyIndex::Phy0)),
                PhyOverrides::from_set(state.phys.get(PhyIndex::Phy1)),
            ],
            roles,
        }
    }

    pub fn phy_table(&self) -> PhyTable {
        PhyTable::new(
            self.phys[0].resolve(PhyIndex::Phy0),
            self.phys[1].resolve(PhyIndex::Phy1),
        )
    }

    /// Load parameters, channels and mode into `controller` (no remote calls)
    pub fn apply_to<T: Transport>(&self, controller: &mut PhyController<T>) {
        controller.configure(self.phy_table(), self.channels, self.tuning_mode);
    }

    /// Fails on NaN or infinite parameters, which serde_json would write
    /// as `null` and read back as the built-in default
    pub fn to_json_pretty(&self) -> Result<String, String> {
        self.check_finite()?;
        serde_json::to_string_pretty(self).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_uses_defaults() {
        let profile = Profile::from_json_str("{}").unwrap();
        assert_eq!(profile.tuning_mode, TuningMode::CenterOffset);
        assert_eq!(profile.channels, ChannelMapping { rx: 0, tx: 0 });
        assert_eq!(profile.phy_table(), PhyTable::default());
        assert_eq!(profile.roles.message_selector, "MessageSelector_0");
    }

    #[test]
    fn test_partial_overrides() {
        let profile = Profile::from_json_str(
            r#"{
                "tuning_mode": "direct",
                "channels": {"rx": 1, "tx": 0},
                "phys": [{"rx_gain": 42}, {"center_frequency": 2.44e9}],
                "roles": {"rf_sink": "UhdSink_0"}
            }"#,
        )
        .unwrap();
        let table = profile.phy_table();
        assert_eq!(profile.tuning_mode, TuningMode::Direct);
        assert_eq!(table.get(PhyIndex::Phy0).rx_gain, 42.0);
        assert_eq!(table.get(PhyIndex::Phy0).tx_gain, 60.0);
        assert_eq!(table.get(PhyIndex::Phy1).center_frequency, 2.44e9);
        assert_eq!(profile.roles.rf_sink, "UhdSink_0");
        assert_eq!(profile.roles.rf_source, "SoapySource_0");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(Profile::from_json_str(r#"{"phys": [{"bandwidth": 1}, {}]}"#).is_err());
        assert!(Profile::from_json_str(r#"{"tuning": "direct"}"#).is_err());
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let mut state = ControllerState::default();
        state.phys.get_mut(PhyIndex::Phy1).tx_gain = 33.0;
        let profile = Profile::from_state(&state, RoleNames::default());
        let parsed = Profile::from_json_str(&profile.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed.phy_table(), state.phys);
    }

    #[test]
    fn test_non_finite_parameters_rejected() {
        let mut state = ControllerState::default();
        state.phys.get_mut(PhyIndex::Phy1).rx_gain = f64::NAN;
        let profile = Profile::from_state(&state, RoleNames::default());
        let err = profile.to_json_pretty().unwrap_err();
        assert!(err.contains("phys[1].rx_gain"));

        state.phys.get_mut(PhyIndex::Phy1).rx_gain = 10.0;
        state.phys.get_mut(PhyIndex::Phy0).center_frequency = f64::INFINITY;
        let profile = Profile::from_state(&state, RoleNames::default());
        assert!(profile.to_json_pretty().is_err());

        // serde_json writes both as null; a null override reads back as unset
        let parsed = Profile::from_json_str(r#"{"phys": [{"rx_gain": null}, {}]}"#).unwrap();
        assert_eq!(parsed.phys[0].rx_gain, None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Profile::load(Path::new("/nonexistent/phy-profile.json")).unwrap_err();
        assert!(matches!(err, ControllerError::Profile { .. }));
    }
}
