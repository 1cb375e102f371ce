use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::transport::Transport;
use crate::wire::RemoteCall;

/// Named progress bars drawn together on the terminal
#[derive(Clone)]
pub struct ProgressManager {
    mp: MultiProgress,
    bars: Arc<Mutex<HashMap<String, ProgressBar>>>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            mp: MultiProgress::new(),
            bars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a new bar
    /// - `id`: unique bar id
    /// - `total`: length of the bar
    /// - `template`: indicatif template
    /// - `message`: initial message
    pub fn create_bar(
        &self,
        id: &str,
        total: u64,
        template: &str,
        message: &str,
    ) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;

        if bars.contains_key(id) {
            return Err(format!("Progress bar '{}' already exists", id));
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .map_err(|e| format!("Bad template: {}", e))?
            .progress_chars("█▉▊▋▌▍▎▏ ");
        let pb = self
            .mp
            .add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_message(message.to_string());

        bars.insert(id.to_string(), pb);
        Ok(())
    }

    fn with_bar(&self, id: &str, f: impl FnOnce(&ProgressBar)) -> Result<(), String> {
        let bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        match bars.get(id) {
            Some(pb) => {
                f(pb);
                Ok(())
            }
            None => Err(format!("Progress bar '{}' not found", id)),
        }
    }

    pub fn inc(&self, id: &str, value: u64) -> Result<(), String> {
        self.with_bar(id, |pb| pb.inc(value))
    }

    pub fn set_message(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.set_message(message.to_string()))
    }

    pub fn position(&self, id: &str) -> Option<u64> {
        let bars = self.bars.lock().ok()?;
        bars.get(id).map(|pb| pb.position())
    }

    /// Finish a bar, keeping it on screen, and forget it
    pub fn finish(&self, id: &str, message: &str) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        if let Some(pb) = bars.remove(id) {
            pb.finish_with_message(message.to_string());
            Ok(())
        } else {
            Err(format!("Progress bar '{}' not found", id))
        }
    }

    /// Stop a bar where it is (failed sequence) and forget it
    pub fn abandon(&self, id: &str, message: &str) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        if let Some(pb) = bars.remove(id) {
            pb.abandon_with_message(message.to_string());
            Ok(())
        } else {
            Err(format!("Progress bar '{}' not found", id))
        }
    }

    pub fn exists(&self, id: &str) -> bool {
        if let Ok(bars) = self.bars.lock() {
            bars.contains_key(id)
        } else {
            false
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

pub mod templates {
    pub const APPLY: &str = "APPLY [{bar:30.cyan}] {pos}/{len} calls {msg}";
    pub const TUNE: &str = "TUNE  [{bar:30.green}] {pos}/{len} calls {msg}";
}

/// Transport wrapper that advances the bar `bar_id` after every call
pub struct ProgressTransport<T> {
    inner: T,
    progress: ProgressManager,
    bar_id: String,
}

impl<T: Transport> ProgressTransport<T> {
    pub fn new(inner: T, progress: ProgressManager, bar_id: &str) -> Self {
        Self {
            inner,
            progress,
            bar_id: bar_id.to_string(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for ProgressTransport<T> {
    fn get_json(&mut self, url: &str) -> Result<serde_json::Value, TransportError> {
        self.inner.get_json(url)
    }

    fn call(&mut self, url: &str, call: &RemoteCall) -> Result<(), TransportError> {
        // Calls made while no bar is open are passed through untouched
        let _ = self
            .progress
            .set_message(&self.bar_id, call.op.name());
        let result = self.inner.call(url, call);
        if result.is_ok() {
            let _ = self.progress.inc(&self.bar_id, 1);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{CallPayload, RemoteOp};

    struct NullTransport {
        calls: usize,
        fail: bool,
    }

    impl Transport for NullTransport {
        fn get_json(&mut self, _url: &str) -> Result<serde_json::Value, TransportError> {
            Ok(serde_json::Value::Null)
        }

        fn call(&mut self, _url: &str, _call: &RemoteCall) -> Result<(), TransportError> {
            self.calls += 1;
            if self.fail {
                Err(TransportError::Request("refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_progress_transport_counts_successful_calls() {
        let progress = ProgressManager::new();
        progress
            .create_bar("apply", 3, templates::APPLY, "PHY 0")
            .unwrap();
        let mut transport = ProgressTransport::new(
            NullTransport {
                calls: 0,
                fail: false,
            },
            progress.clone(),
            "apply",
        );
        let call = RemoteCall::new(RemoteOp::RfSinkGain, CallPayload::f64(10.0));
        transport.call("http://fg/block/1/call/1/", &call).unwrap();
        transport.call("http://fg/block/1/call/1/", &call).unwrap();
        assert_eq!(progress.position("apply"), Some(2));
        assert_eq!(transport.inner().calls, 2);
        progress.finish("apply", "done").unwrap();
        assert!(!progress.exists("apply"));
    }

    #[test]
    fn test_progress_transport_without_bar() {
        let progress = ProgressManager::new();
        let mut transport = ProgressTransport::new(
            NullTransport {
                calls: 0,
                fail: true,
            },
            progress.clone(),
            "apply",
        );
        let call = RemoteCall::new(RemoteOp::RfSinkGain, CallPayload::f64(10.0));
        assert!(transport.call("http://fg/", &call).is_err());
        assert_eq!(transport.inner().calls, 1);
        assert!(!progress.exists("apply"));
    }

    #[test]
    fn test_duplicate_bar_rejected() {
        let progress = ProgressManager::new();
        progress.create_bar("x", 1, templates::TUNE, "").unwrap();
        assert!(progress.create_bar("x", 1, templates::TUNE, "").is_err());
    }
}
