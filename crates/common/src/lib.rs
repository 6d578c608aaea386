//! Shared types for the waypoint marker crates.
//!
//! # Invariants
//! - A [`Waypoint`] is immutable once constructed.
//! - Camera state is supplied by the host each frame and never owned here.

mod types;

pub use types::{CameraPose, Perspective, Waypoint, unpack_rgb};

pub fn crate_info() -> &'static str {
    "waypoints-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
