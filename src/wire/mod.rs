//! Control-plane wire format
//!
//! Every controllable parameter is a handler on a remote block, reached at
//! `<base_url>/block/<id>/call/<call_index>/` and written with a tagged JSON
//! value. All numbers are truncated toward zero before they leave the process.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::directory::{BlockRole, Resolution};
use crate::error::TransportError;
use crate::utils::consts::*;

/// Round toward zero to an integer. NaN encodes as 0 and values beyond the
/// i64 range saturate.
pub fn truncate_to_wire(value: f64) -> i64 {
    value.trunc() as i64
}

/// Plain tagged scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Frequencies, gains and rates
    F64(f64),
    /// Selector indices and channels
    U32(u32),
}

/// Body of one remote call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallPayload {
    Scalar(Scalar),
    /// Value applied to one frontend channel
    ScalarChannelPair(f64, u32),
}

impl CallPayload {
    pub fn f64(value: f64) -> Self {
        CallPayload::Scalar(Scalar::F64(value))
    }

    pub fn u32(value: u32) -> Self {
        CallPayload::Scalar(Scalar::U32(value))
    }

    pub fn with_channel(value: f64, channel: u32) -> Self {
        CallPayload::ScalarChannelPair(value, channel)
    }

    /// Value as it will appear on the wire
    pub fn wire_value(&self) -> i64 {
        match self {
            CallPayload::Scalar(Scalar::F64(v)) => truncate_to_wire(*v),
            CallPayload::Scalar(Scalar::U32(v)) => i64::from(*v),
            CallPayload::ScalarChannelPair(v, _) => truncate_to_wire(*v),
        }
    }

    pub fn channel(&self) -> Option<u32> {
        match self {
            CallPayload::ScalarChannelPair(_, ch) => Some(*ch),
            CallPayload::Scalar(_) => None,
        }
    }

    fn to_wire(self) -> WirePmt {
        match self {
            CallPayload::Scalar(Scalar::F64(v)) => WirePmt::F64(truncate_to_wire(v)),
            CallPayload::Scalar(Scalar::U32(v)) => WirePmt::U32(v),
            CallPayload::ScalarChannelPair(v, ch) => {
                WirePmt::VecPmt(vec![WirePmt::F64(truncate_to_wire(v)), WirePmt::U32(ch)])
            }
        }
    }
}

impl Serialize for CallPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl fmt::Display for CallPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallPayload::Scalar(_) => write!(f, "{}", self.wire_value()),
            CallPayload::ScalarChannelPair(_, ch) => write!(f, "{} @ ch{}", self.wire_value(), ch),
        }
    }
}

// Externally tagged, matching the flowgraph's message type
#[derive(Serialize)]
enum WirePmt {
    F64(i64),
    U32(u32),
    VecPmt(Vec<WirePmt>),
}

/// Every parameter handler the controller may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemoteOp {
    SourceSelectorIndex,
    SinkSelectorIndex,
    MessageSelectorIndex,
    RfSourceFrequency,
    RfSourceGain,
    RfSourceSampleRate,
    RfSourceCenterFrequency,
    RfSourceFrequencyOffset,
    RfSinkFrequency,
    RfSinkGain,
    RfSinkSampleRate,
    RfSinkCenterFrequency,
    RfSinkFrequencyOffset,
}

impl RemoteOp {
    pub const ALL: [RemoteOp; 13] = [
        RemoteOp::SourceSelectorIndex,
        RemoteOp::SinkSelectorIndex,
        RemoteOp::MessageSelectorIndex,
        RemoteOp::RfSourceFrequency,
        RemoteOp::RfSourceGain,
        RemoteOp::RfSourceSampleRate,
        RemoteOp::RfSourceCenterFrequency,
        RemoteOp::RfSourceFrequencyOffset,
        RemoteOp::RfSinkFrequency,
        RemoteOp::RfSinkGain,
        RemoteOp::RfSinkSampleRate,
        RemoteOp::RfSinkCenterFrequency,
        RemoteOp::RfSinkFrequencyOffset,
    ];

    pub fn role(&self) -> BlockRole {
        use RemoteOp::*;
        match self {
            SourceSelectorIndex => BlockRole::SourceSelector,
            SinkSelectorIndex => BlockRole::SinkSelector,
            MessageSelectorIndex => BlockRole::MessageSelector,
            RfSourceFrequency | RfSourceGain | RfSourceSampleRate | RfSourceCenterFrequency
            | RfSourceFrequencyOffset => BlockRole::RfSource,
            RfSinkFrequency | RfSinkGain | RfSinkSampleRate | RfSinkCenterFrequency
            | RfSinkFrequencyOffset => BlockRole::RfSink,
        }
    }

    /// Handler index on the remote block; fixed by the block implementation
    pub fn call_index(&self) -> u32 {
        use RemoteOp::*;
        match self {
            SourceSelectorIndex => CALL_SOURCE_SELECTOR_INDEX,
            SinkSelectorIndex => CALL_SINK_SELECTOR_INDEX,
            MessageSelectorIndex => CALL_MESSAGE_SELECTOR_INDEX,
            RfSourceFrequency | RfSinkFrequency => CALL_FREQUENCY,
            RfSourceGain | RfSinkGain => CALL_GAIN,
            RfSourceSampleRate | RfSinkSampleRate => CALL_SAMPLE_RATE,
            RfSourceCenterFrequency | RfSinkCenterFrequency => CALL_CENTER_FREQUENCY,
            RfSourceFrequencyOffset | RfSinkFrequencyOffset => CALL_FREQUENCY_OFFSET,
        }
    }

    pub fn is_selector(&self) -> bool {
        matches!(
            self,
            RemoteOp::SourceSelectorIndex
                | RemoteOp::SinkSelectorIndex
                | RemoteOp::MessageSelectorIndex
        )
    }

    pub fn name(&self) -> &'static str {
        use RemoteOp::*;
        match self {
            SourceSelectorIndex => "source selector index",
            SinkSelectorIndex => "sink selector index",
            MessageSelectorIndex => "message selector index",
            RfSourceFrequency => "RF source frequency",
            RfSourceGain => "RF source gain",
            RfSourceSampleRate => "RF source sample rate",
            RfSourceCenterFrequency => "RF source center frequency",
            RfSourceFrequencyOffset => "RF source frequency offset",
            RfSinkFrequency => "RF sink frequency",
            RfSinkGain => "RF sink gain",
            RfSinkSampleRate => "RF sink sample rate",
            RfSinkCenterFrequency => "RF sink center frequency",
            RfSinkFrequencyOffset => "RF sink frequency offset",
        }
    }
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of an apply sequence or an immediate frontend call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteCall {
    pub op: RemoteOp,
    pub payload: CallPayload,
}

impl RemoteCall {
    pub fn new(op: RemoteOp, payload: CallPayload) -> Self {
        Self { op, payload }
    }
}

/// `<base_url>/block/<id>/call/<call_index>/`, with exactly one slash
/// between base and path regardless of how `base_url` ends
pub fn call_url(base_url: &str, block_id: &str, call_index: u32) -> String {
    format!(
        "{}/block/{}/call/{}/",
        base_url.trim_end_matches('/'),
        block_id,
        call_index
    )
}

/// Remote operation -> call URL, fixed once discovery has run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointTable {
    urls: BTreeMap<RemoteOp, String>,
}

impl EndpointTable {
    pub fn build(base_url: &str, resolution: &Resolution) -> Self {
        let urls = RemoteOp::ALL
            .iter()
            .filter_map(|op| {
                resolution
                    .get(op.role())
                    .map(|id| (*op, call_url(base_url, id.as_str(), op.call_index())))
            })
            .collect();
        Self { urls }
    }

    /// Call URL of `op`, or `Unresolved` when its block was not discovered
    pub fn url(&self, op: RemoteOp) -> Result<&str, TransportError> {
        self.urls
            .get(&op)
            .map(String::as_str)
            .ok_or(TransportError::Unresolved { role: op.role() })
    }

    pub fn iter(&self) -> impl Iterator<Item = (RemoteOp, &str)> {
        self.urls
            .iter()
            .map(|(op, url)| (*op, url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
