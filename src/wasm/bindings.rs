//! JavaScript bindings for the replica
//!
//! Wire messages, events and snapshots cross the boundary as JSON strings;
//! the host owns the channel and calls `receive` / `takeOutgoing` itself.

use crate::config::ReplicaConfig;
use crate::protocol::WireMessage;
use crate::replica::{Replica, Snapshot};
use std::time::Duration;
use wasm_bindgen::prelude::*;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// JavaScript-friendly wrapper for Replica
#[wasm_bindgen]
pub struct WasmReplica {
    inner: Replica,

    /// Pending head sequence and the host time (ms) it was first seen
    head_seen: Option<(u64, f64)>,
}

#[wasm_bindgen]
impl WasmReplica {
    /// Create a replica; `config_json` must name the `site`
    #[wasm_bindgen(constructor)]
    pub fn new(id: String, config_json: String, text: String) -> Result<WasmReplica, JsValue> {
        let config = ReplicaConfig::from_json(&config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Ok(Self {
            inner: Replica::with_text(id, config, &text),
            head_seen: None,
        })
    }

    /// Apply a local edit; returns its sequence number
    #[wasm_bindgen(js_name = submitLocalEdit)]
    pub fn submit_local_edit(
        &mut self,
        start: usize,
        end: usize,
        text: String,
    ) -> Result<u64, JsValue> {
        self.inner.submit_local_edit(start, end, &text).map_err(to_js)
    }

    #[wasm_bindgen(js_name = submitLocalSelection)]
    pub fn submit_local_selection(&mut self, start: usize, end: usize) -> Result<(), JsValue> {
        self.inner.submit_local_selection(start, end).map_err(to_js)
    }

    /// Feed one wire message (JSON) from the peer
    #[wasm_bindgen(js_name = receive)]
    pub fn receive(&mut self, message_json: String) -> Result<(), JsValue> {
        let msg: WireMessage = serde_json::from_str(&message_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid message: {}", e)))?;
        self.inner.receive(msg).map_err(to_js)
    }

    /// Queued wire messages as a JSON array
    #[wasm_bindgen(js_name = takeOutgoing)]
    pub fn take_outgoing(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.drain_outgoing())
            .map_err(|e| JsValue::from_str(&format!("JSON serialization failed: {}", e)))
    }

    /// Raised events as a JSON array
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.drain_events())
            .map_err(|e| JsValue::from_str(&format!("JSON serialization failed: {}", e)))
    }

    /// Stall check driven by the host clock (e.g. `performance.now()`)
    ///
    /// The head's wait is measured from the first call that saw it, so call
    /// this periodically.
    #[wasm_bindgen(js_name = checkStalled)]
    pub fn check_stalled(&mut self, now_ms: f64) -> bool {
        let Some(sequence) = self.inner.pending().head().map(|head| head.op.sequence()) else {
            self.head_seen = None;
            return false;
        };
        let since = match self.head_seen {
            Some((seen, since)) if seen == sequence => since,
            _ => {
                self.head_seen = Some((sequence, now_ms));
                now_ms
            }
        };
        let waited = Duration::from_millis((now_ms - since).max(0.0) as u64);
        self.inner.check_head_waited(waited)
    }

    #[wasm_bindgen(js_name = onChannelFailure)]
    pub fn on_channel_failure(&mut self, detail: String) {
        self.inner.on_channel_failure(detail);
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.inner.authoritative_snapshot().to_json().map_err(to_js)
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn reset(&mut self, snapshot_json: String) -> Result<(), JsValue> {
        let snapshot = Snapshot::from_json(&snapshot_json).map_err(to_js)?;
        self.inner.reset(&snapshot);
        self.head_seen = None;
        Ok(())
    }

    #[wasm_bindgen(js_name = toString)]
    pub fn to_string(&self) -> String {
        self.inner.text()
    }

    #[wasm_bindgen(js_name = selectionStart)]
    pub fn selection_start(&self) -> usize {
        self.inner.selection().start
    }

    #[wasm_bindgen(js_name = selectionEnd)]
    pub fn selection_end(&self) -> usize {
        self.inner.selection().end
    }

    #[wasm_bindgen(js_name = pendingCount)]
    pub fn pending_count(&self) -> usize {
        self.inner.pending().len()
    }

    #[wasm_bindgen(js_name = isDegraded)]
    pub fn is_degraded(&self) -> bool {
        self.inner.degraded().is_some()
    }

    #[wasm_bindgen(js_name = isFailed)]
    pub fn is_failed(&self) -> bool {
        self.inner.is_failed()
    }
}
