//! Waypoint marker rendering against a host-supplied graphics device.
//!
//! # Invariants
//! - The renderer never mutates waypoints or camera state.
//! - Device state and the transform stack are restored after every draw,
//!   including draws that fail or panic partway.
//! - Nothing is cached between calls.
//!
//! The device, text and texture collaborators are traits and plain values
//! passed into each call. [`RecordingDevice`] and [`FixedWidthFont`] are
//! in-memory implementations for tests and tooling.

mod config;
mod device;
mod layout;
mod recording;
mod renderer;
mod text;

pub use config::{ConfigError, MARKER_TEXTURE, MarkerConfig, RenderOrigin};
pub use device::{
    BlendFactor, Capability, DeviceError, DeviceState, GraphicsDevice, TextureId, TexturedVertex,
};
pub use layout::{
    MARKER_QUAD, MarkerLayout, PassConfig, Rotation, clamped_offset, distance_factor,
    facing_rotations, label_text,
};
pub use recording::{DeviceCommand, DrawCall, RecordingDevice};
pub use renderer::{MarkerRenderer, StateScope};
pub use text::{ASCII_FONT_TEXTURE, FixedWidthFont, TextRenderer};

pub fn crate_info() -> &'static str {
    "waypoints-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
