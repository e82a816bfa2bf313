//! DSP layer — Pure Rust audio synthesis.
//!
//! The generators here feed whatever audio clock the host provides:
//! an AudioWorklet pulling rendered samples over WASM in the browser,
//! or a native output callback in tests and CLI tools.

pub mod oscillator;
pub mod voice;
