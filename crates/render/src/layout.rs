use glam::{DVec3, Vec3};
use waypoints_common::{CameraPose, Waypoint, unpack_rgb};

use crate::config::{MarkerConfig, RenderOrigin};
use crate::device::TexturedVertex;

/// Unit quad centered at the origin, two triangles, UV 0..1.
#[rustfmt::skip]
pub const MARKER_QUAD: [TexturedVertex; 6] = [
    TexturedVertex::new([-0.5, -0.5, 0.0], [0.0, 0.0]),
    TexturedVertex::new([ 0.5,  0.5, 0.0], [1.0, 1.0]),
    TexturedVertex::new([ 0.5, -0.5, 0.0], [1.0, 0.0]),
    TexturedVertex::new([-0.5, -0.5, 0.0], [0.0, 0.0]),
    TexturedVertex::new([-0.5,  0.5, 0.0], [0.0, 1.0]),
    TexturedVertex::new([ 0.5,  0.5, 0.0], [1.0, 1.0]),
];

/// Settings for one of the two marker passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassConfig {
    pub depth_test: bool,
    pub blend_alpha: f32,
}

/// Rotation in degrees about an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub degrees: f32,
    pub axis: Vec3,
}

/// Everything the renderer derives from a waypoint and a camera pose before
/// touching the device.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayout {
    /// Block center in world space.
    pub anchor: DVec3,
    pub distance: f32,
    pub label: String,
    /// Unit vector from the camera toward the anchor, or zero when they coincide.
    pub direction: DVec3,
    /// `direction` scaled to at most `fade_distance`.
    pub offset: DVec3,
    /// Translation applied to the marker's local origin.
    pub translation: Vec3,
    /// Camera-facing rotations, applied in order.
    pub rotations: Vec<Rotation>,
    /// Normalized RGB.
    pub color: Vec3,
    pub distance_factor: f32,
    pub final_alpha: f32,
    /// Occluded pass first, depth-tested pass second.
    pub passes: [PassConfig; 2],
}

impl MarkerLayout {
    pub fn compute(waypoint: &Waypoint, camera: &CameraPose, config: &MarkerConfig) -> Self {
        let anchor = waypoint.block_center();
        let to_anchor = anchor - camera.position;
        let distance = to_anchor.length() as f32;
        let direction = to_anchor.normalize_or_zero();
        let offset = clamped_offset(direction, distance, config.fade_distance);

        let base = match config.origin {
            RenderOrigin::World => camera.position + offset,
            RenderOrigin::Camera => offset,
        };
        let translation = base.as_vec3() + Vec3::new(0.0, config.vertical_bias, 0.0);

        let distance_factor = distance_factor(distance, config.fade_distance, config.fade_range);
        let final_alpha = 1.0 - distance_factor * (1.0 - config.far_alpha);

        Self {
            anchor,
            distance,
            label: label_text(waypoint.name(), distance),
            direction,
            offset,
            translation,
            rotations: facing_rotations(camera),
            color: unpack_rgb(waypoint.color_rgb()),
            distance_factor,
            final_alpha,
            passes: [
                PassConfig {
                    depth_test: false,
                    blend_alpha: config.occluded_alpha,
                },
                PassConfig {
                    depth_test: true,
                    blend_alpha: final_alpha,
                },
            ],
        }
    }
}

/// `"<name> (<rounded distance>m)"`.
pub fn label_text(name: &str, distance: f32) -> String {
    format!("{name} ({}m)", distance.round() as i64)
}

/// Scale a unit direction to `min(fade_distance, distance)`.
pub fn clamped_offset(direction: DVec3, distance: f32, fade_distance: f32) -> DVec3 {
    direction * f64::from(fade_distance.min(distance))
}

/// 0 up to `fade_distance`, 1 from `fade_distance + fade_range`, linear between.
pub fn distance_factor(distance: f32, fade_distance: f32, fade_range: f32) -> f32 {
    (distance - fade_distance).max(0.0).min(fade_range) / fade_range
}

/// Rotations that turn the quad toward the camera.
pub fn facing_rotations(camera: &CameraPose) -> Vec<Rotation> {
    let mut rotations = vec![
        Rotation {
            degrees: -camera.yaw,
            axis: Vec3::Y,
        },
        Rotation {
            degrees: camera.pitch,
            axis: Vec3::X,
        },
    ];
    if camera.is_rear_view() {
        rotations.push(Rotation {
            degrees: 180.0,
            axis: Vec3::Y,
        });
    }
    rotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoints_common::Perspective;

    fn layout_at(distance_z: f64) -> MarkerLayout {
        // Waypoint anchor at (0.5, 0.5, 0.5); camera straight down -Z.
        let w = Waypoint::new("Probe", 0, 0, 0, 0xFFFFFF);
        let cam = CameraPose::new(DVec3::new(0.5, 0.5, 0.5 - distance_z), 0.0, 0.0);
        MarkerLayout::compute(&w, &cam, &MarkerConfig::default())
    }

    #[test]
    fn anchor_and_distance_for_known_pose() {
        let w = Waypoint::new("Spawn", 0, 0, 0, 0x00FF00);
        let cam = CameraPose::new(DVec3::new(0.0, 0.0, -20.0), 0.0, 0.0);
        let layout = MarkerLayout::compute(&w, &cam, &MarkerConfig::default());

        assert_eq!(layout.anchor, DVec3::new(0.5, 0.5, 0.5));
        // sqrt(0.25 + 0.25 + 420.25)
        assert!((layout.distance - 20.512).abs() < 1e-3);
        assert_eq!(layout.label, "Spawn (21m)");
    }

    #[test]
    fn offset_unclamped_within_fade_distance() {
        for d in [0.5, 3.0, 9.99, 10.0] {
            let layout = layout_at(d);
            assert!((layout.offset.length() - d).abs() < 1e-5, "d={d}");
        }
    }

    #[test]
    fn offset_clamped_beyond_fade_distance() {
        for d in [10.5, 50.0, 1000.0, 1.0e6] {
            let layout = layout_at(d);
            assert!((layout.offset.length() - 10.0).abs() < 1e-9, "d={d}");
            assert!(layout.offset.z > 0.0);
        }
    }

    #[test]
    fn camera_inside_anchor_gives_zero_direction() {
        let layout = layout_at(0.0);
        assert_eq!(layout.distance, 0.0);
        assert_eq!(layout.direction, DVec3::ZERO);
        assert_eq!(layout.offset, DVec3::ZERO);
        assert_eq!(layout.label, "Probe (0m)");
    }

    #[test]
    fn distance_factor_ramp() {
        assert_eq!(distance_factor(0.0, 10.0, 64.0), 0.0);
        assert_eq!(distance_factor(10.0, 10.0, 64.0), 0.0);
        assert_eq!(distance_factor(42.0, 10.0, 64.0), 0.5);
        assert_eq!(distance_factor(74.0, 10.0, 64.0), 1.0);
        assert_eq!(distance_factor(5000.0, 10.0, 64.0), 1.0);
    }

    #[test]
    fn final_alpha_bounded_and_non_increasing() {
        let mut previous = f32::INFINITY;
        for step in 0..200 {
            let layout = layout_at(step as f64 * 0.5);
            assert!((0.5..=1.0).contains(&layout.final_alpha));
            assert!(layout.final_alpha <= previous);
            previous = layout.final_alpha;
        }
        assert_eq!(layout_at(5.0).final_alpha, 1.0);
        assert_eq!(layout_at(80.0).final_alpha, 0.5);
    }

    #[test]
    fn passes_are_occluded_then_depth_tested() {
        let layout = layout_at(42.0);
        assert_eq!(
            layout.passes[0],
            PassConfig {
                depth_test: false,
                blend_alpha: 0.5
            }
        );
        assert!(layout.passes[1].depth_test);
        assert!((layout.passes[1].blend_alpha - 0.75).abs() < 1e-6);
    }

    #[test]
    fn label_rounds_distance() {
        assert_eq!(label_text("Home", 12.49), "Home (12m)");
        assert_eq!(label_text("Home", 12.5), "Home (13m)");
        assert_eq!(label_text("Far away", 1234.7), "Far away (1235m)");
    }

    #[test]
    fn translation_includes_camera_and_bias() {
        let w = Waypoint::new("Tower", 100, 64, 100, 0);
        let cam = CameraPose::new(DVec3::new(100.5, 64.5, 80.5), 0.0, 0.0);
        let layout = MarkerLayout::compute(&w, &cam, &MarkerConfig::default());
        let expected = Vec3::new(100.5, 64.5 + 1.5, 90.5);
        assert!(layout.translation.distance(expected) < 1e-4);

        let relative = MarkerConfig {
            origin: RenderOrigin::Camera,
            ..MarkerConfig::default()
        };
        let layout = MarkerLayout::compute(&w, &cam, &relative);
        assert!(layout.translation.distance(Vec3::new(0.0, 1.5, 10.0)) < 1e-5);
    }

    #[test]
    fn color_is_unpacked() {
        let w = Waypoint::new("Orange", 0, 0, 0, 0xFF8040);
        let layout = MarkerLayout::compute(&w, &CameraPose::default(), &MarkerConfig::default());
        assert_eq!(layout.color, unpack_rgb(0xFF8040));
    }

    #[test]
    fn rear_view_adds_only_a_half_turn() {
        let w = Waypoint::new("Cave", -20, 30, 55, 0x123456);
        let cam = CameraPose::new(DVec3::new(3.0, 70.0, -8.0), 37.0, -12.0);
        let config = MarkerConfig::default();

        let front = MarkerLayout::compute(&w, &cam, &config);
        let rear = MarkerLayout::compute(
            &w,
            &cam.with_perspective(Perspective::ThirdPersonFront),
            &config,
        );

        assert_eq!(front.rotations.len(), 2);
        assert_eq!(rear.rotations.len(), 3);
        assert_eq!(rear.rotations[..2], front.rotations[..]);
        assert_eq!(
            rear.rotations[2],
            Rotation {
                degrees: 180.0,
                axis: Vec3::Y
            }
        );

        let strip = |mut l: MarkerLayout| {
            l.rotations.clear();
            l
        };
        assert_eq!(strip(front), strip(rear));
    }

    #[test]
    fn facing_rotations_negate_yaw() {
        let cam = CameraPose::new(DVec3::ZERO, 90.0, 30.0);
        let r = facing_rotations(&cam);
        assert_eq!(r[0].degrees, -90.0);
        assert_eq!(r[0].axis, Vec3::Y);
        assert_eq!(r[1].degrees, 30.0);
        assert_eq!(r[1].axis, Vec3::X);
    }

    #[test]
    fn nan_camera_does_not_panic() {
        let w = Waypoint::new("Nan", 0, 0, 0, 0);
        let cam = CameraPose::new(DVec3::splat(f64::NAN), f32::NAN, f32::NAN);
        let layout = MarkerLayout::compute(&w, &cam, &MarkerConfig::default());
        assert!(layout.distance.is_nan());
    }
}
