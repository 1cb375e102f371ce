//! Block directory
//!
//! Resolves the symbolic roles the controller drives (selectors and the RF
//! frontend) to the block ids published by the flowgraph. Roles are
//! identified through a declarative role -> matcher table, so the controller
//! never looks at instance names itself.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{ControllerError, ControllerResult, TransportError};
use crate::transport::Transport;
use crate::utils::consts::*;

/// Opaque block identifier, rendered verbatim into call URLs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlockId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => BlockId(n.to_string()),
            RawId::Text(s) => BlockId(s),
        })
    }
}

/// One entry of the flowgraph's block list. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockDescriptor {
    pub id: BlockId,
    pub instance_name: String,
    #[serde(default)]
    pub type_name: Option<String>,
}

/// Document returned by the discovery request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowgraphDescription {
    pub blocks: Vec<BlockDescriptor>,
}

impl FlowgraphDescription {
    pub fn from_json(value: serde_json::Value) -> Result<Self, TransportError> {
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Remote blocks the controller needs to address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockRole {
    SourceSelector,
    SinkSelector,
    MessageSelector,
    RfSource,
    RfSink,
}

impl BlockRole {
    pub const ALL: [BlockRole; 5] = [
        BlockRole::SourceSelector,
        BlockRole::SinkSelector,
        BlockRole::MessageSelector,
        BlockRole::RfSource,
        BlockRole::RfSink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BlockRole::SourceSelector => "source selector",
            BlockRole::SinkSelector => "sink selector",
            BlockRole::MessageSelector => "message selector",
            BlockRole::RfSource => "RF source",
            BlockRole::RfSink => "RF sink",
        }
    }

    /// Instance name the stock multi-PHY flowgraph gives this block
    pub fn default_instance_name(&self) -> &'static str {
        match self {
            BlockRole::SourceSelector => SOURCE_SELECTOR_NAME,
            BlockRole::SinkSelector => SINK_SELECTOR_NAME,
            BlockRole::MessageSelector => MESSAGE_SELECTOR_NAME,
            BlockRole::RfSource => RF_SOURCE_NAME,
            BlockRole::RfSink => RF_SINK_NAME,
        }
    }
}

impl fmt::Display for BlockRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type BlockPredicate = Box<dyn Fn(&BlockDescriptor) -> bool + Send + Sync>;

/// Predicate identifying the block that plays `role`
pub struct RoleMatcher {
    pub role: BlockRole,
    description: String,
    predicate: BlockPredicate,
}

impl RoleMatcher {
    pub fn new(
        role: BlockRole,
        description: impl Into<String>,
        predicate: impl Fn(&BlockDescriptor) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            role,
            description: description.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Exact match on `instance_name`
    pub fn instance_name(role: BlockRole, name: impl Into<String>) -> Self {
        let name = name.into();
        let description = format!("instance_name == {name:?}");
        Self::new(role, description, move |block| block.instance_name == name)
    }

    pub fn matches(&self, block: &BlockDescriptor) -> bool {
        (self.predicate)(block)
    }
}

impl fmt::Debug for RoleMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleMatcher")
            .field("role", &self.role)
            .field("predicate", &self.description)
            .finish()
    }
}

/// Matchers for the stock flowgraph, one exact instance name per role
pub fn default_matchers() -> Vec<RoleMatcher> {
    BlockRole::ALL
        .iter()
        .map(|role| RoleMatcher::instance_name(*role, role.default_instance_name()))
        .collect()
}

/// Outcome of matching the block list against the role table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    found: BTreeMap<BlockRole, BlockId>,
    missing: Vec<BlockRole>,
}

impl Resolution {
    pub fn get(&self, role: BlockRole) -> Option<&BlockId> {
        self.found.get(&role)
    }

    pub fn missing(&self) -> &[BlockRole] {
        &self.missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Turn an incomplete resolution into `DiscoveryIncomplete`
    pub fn require_complete(self) -> ControllerResult<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(ControllerError::DiscoveryIncomplete {
                missing: self.missing,
            })
        }
    }
}

/// Match `blocks` against `matchers`. The first matching block wins a role;
/// roles without any matching block are listed as missing.
pub fn resolve(blocks: &[BlockDescriptor], matchers: &[RoleMatcher]) -> Resolution {
    let mut resolution = Resolution::default();

    for matcher in matchers {
        if resolution.found.contains_key(&matcher.role) {
            continue;
        }
        if let Some(block) = blocks.iter().find(|b| matcher.matches(b)) {
            debug!(
                "{} -> block {} ({})",
                matcher.role, block.id, block.instance_name
            );
            resolution
                .found
                .insert(matcher.role, block.id.clone());
        }
    }

    resolution.missing = BlockRole::ALL
        .into_iter()
        .filter(|role| !resolution.found.contains_key(role))
        .collect();

    resolution
}

/// Fetch the flowgraph description from `base_url` and resolve all roles.
///
/// Missing roles are reported through the log, not returned as an error.
pub fn discover<T: Transport>(
    transport: &mut T,
    base_url: &str,
    matchers: &[RoleMatcher],
) -> ControllerResult<(FlowgraphDescription, Resolution)> {
    let document = transport
        .get_json(base_url)
        .map_err(ControllerError::Discovery)?;
    let description = FlowgraphDescription::from_json(document).map_err(ControllerError::Discovery)?;

    let resolution = resolve(&description.blocks, matchers);
    for role in resolution.missing() {
        warn!("Cannot find {} in flowgraph at {}", role, base_url);
    }

    Ok((description, resolution))
}
