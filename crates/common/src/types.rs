use glam::{DVec3, IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// A named world position with a display color.
///
/// Fields are private; a waypoint never changes after construction. Two
/// waypoints are equal when name, coordinates and color all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Waypoint {
    name: String,
    x: i32,
    y: i32,
    z: i32,
    /// Packed `0xRRGGBB`.
    color_rgb: u32,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, x: i32, y: i32, z: i32, color_rgb: u32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z,
            color_rgb,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn color_rgb(&self) -> u32 {
        self.color_rgb
    }

    /// Block coordinate as a vector.
    pub fn block(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Center of the waypoint's block in world space.
    pub fn block_center(&self) -> DVec3 {
        self.block().as_dvec3() + DVec3::splat(0.5)
    }
}

/// Host view mode. Mirrors the host's numeric setting (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Perspective {
    #[default]
    FirstPerson,
    /// Camera behind the player, looking the same way.
    ThirdPersonBack,
    /// Camera in front of the player, looking back at it.
    ThirdPersonFront,
}

impl Perspective {
    /// Map the host's numeric view setting. Unknown values fall back to first person.
    pub fn from_setting(setting: u8) -> Self {
        match setting {
            1 => Perspective::ThirdPersonBack,
            2 => Perspective::ThirdPersonFront,
            _ => Perspective::FirstPerson,
        }
    }

    /// True when the camera faces back toward the player (the rear view).
    pub fn is_rear_view(self) -> bool {
        self == Perspective::ThirdPersonFront
    }
}

/// Camera state supplied by the host for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// World position. Double precision since world coordinates can be large.
    pub position: DVec3,
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    pub perspective: Perspective,
}

impl CameraPose {
    pub fn new(position: DVec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            perspective: Perspective::FirstPerson,
        }
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn is_rear_view(&self) -> bool {
        self.perspective.is_rear_view()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(DVec3::ZERO, 0.0, 0.0)
    }
}

/// Split a packed `0xRRGGBB` color into normalized channels.
///
/// Bits above the low 24 are ignored.
pub fn unpack_rgb(color_rgb: u32) -> Vec3 {
    Vec3::new(
        ((color_rgb >> 16) & 0xFF) as f32 / 255.0,
        ((color_rgb >> 8) & 0xFF) as f32 / 255.0,
        (color_rgb & 0xFF) as f32 / 255.0,
    )
}
