// Used by the pixelflut-client binary.
use {ctrlc as _, humantime as _, seahorse as _, tracing_subscriber as _};

// Used by tests
#[cfg(test)]
use proptest as _;

#[macro_use]
extern crate tracing;

pub mod codec;
pub mod config;
pub mod pattern;
pub mod primitive;
pub mod sink;

mod barnsley;
mod client;
mod mandel;

pub use client::{draw, draw_with_progress};
pub use config::{DrawCfg, Preset};
pub use mandel::Viewport;
pub use sink::{Progress, Summary};
