/// Log level (can be overridden by RUST_LOG)
pub const LOG_LEVEL: &str = "info";

/// Flowgraph control-plane root of a locally running flowgraph
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1337/api/fg/0/";

/// Per-request HTTP timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Default switching period of `phyctl hop` (milliseconds)
pub const DEFAULT_HOP_INTERVAL_MS: u64 = 1000;

/// Polling step while waiting between hops (milliseconds)
pub const HOP_POLL_MS: u64 = 50;

// ============================================================================
// Block instance names published by the multi-PHY flowgraph
// ============================================================================

pub const SOURCE_SELECTOR_NAME: &str = "Selector<2, 1>_0";
pub const SINK_SELECTOR_NAME: &str = "Selector<1, 2>_0";
pub const MESSAGE_SELECTOR_NAME: &str = "MessageSelector_0";
pub const RF_SOURCE_NAME: &str = "SoapySource_0";
pub const RF_SINK_NAME: &str = "SoapySink_0";

// ============================================================================
// Call indices of the remote block handlers
// ============================================================================

/// Output index handler of the source-side selector
pub const CALL_SOURCE_SELECTOR_INDEX: u32 = 0;
/// Input index handler of the sink-side selector
pub const CALL_SINK_SELECTOR_INDEX: u32 = 1;
/// Index handler of the message selector
pub const CALL_MESSAGE_SELECTOR_INDEX: u32 = 1;

pub const CALL_FREQUENCY: u32 = 0;
pub const CALL_GAIN: u32 = 1;
pub const CALL_SAMPLE_RATE: u32 = 2;
pub const CALL_CENTER_FREQUENCY: u32 = 4;
pub const CALL_FREQUENCY_OFFSET: u32 = 5;

// ============================================================================
// Default PHY table (PHY 0 = 5 GHz WLAN, PHY 1 = 2.4 GHz)
// ============================================================================

pub const DEFAULT_RX_FREQUENCY: [f64; 2] = [5170e6, 2480e6];
pub const DEFAULT_TX_FREQUENCY: [f64; 2] = [5170e6, 2480e6];
pub const DEFAULT_RX_GAIN: [f64; 2] = [60.0, 50.0];
pub const DEFAULT_TX_GAIN: [f64; 2] = [60.0, 50.0];
pub const DEFAULT_SAMPLE_RATE: [f64; 2] = [4e6, 4e6];
pub const DEFAULT_CENTER_FREQUENCY: [f64; 2] = [5.1e9, 2.45e9];
pub const DEFAULT_RX_FREQUENCY_OFFSET: [f64; 2] = [0.0, 0.0];
pub const DEFAULT_TX_FREQUENCY_OFFSET: [f64; 2] = [0.0, 0.0];
pub const DEFAULT_RX_CHANNEL: u32 = 0;
pub const DEFAULT_TX_CHANNEL: u32 = 0;
