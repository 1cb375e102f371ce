//! Remote configuration controller for a dual-PHY SDR flowgraph.
//!
//! The flowgraph exposes its blocks over an HTTP control plane. This crate
//! finds the routing selectors and the RF frontend blocks, keeps a parameter
//! set for each of the two PHYs, and retunes the flowgraph whenever a PHY is
//! selected.

pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod phy;
pub mod transport;
pub mod ui;
pub mod utils;
pub mod wire;

pub use controller::{ControllerHandle, ControllerState, ControllerWorker, PhyController};
pub use error::{ControllerError, ControllerResult, TransportError};
pub use phy::{ChannelMapping, PhyField, PhyIndex, PhyParameterSet, TuningMode};
