//! WASM bindings for textsync
//!
//! Exposes a single [`WasmReplica`] so an editor running in the browser can
//! host either side of a session. There is no `Instant` on wasm32, so ACK
//! stalls are detected with `checkStalled(nowMs)` against the host's clock.

pub mod bindings;
pub mod utils;

pub use bindings::WasmReplica;
pub use utils::init_panic_hook;
