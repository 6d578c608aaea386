use std::ops::{Deref, DerefMut};

use glam::{Vec2, Vec3};
use waypoints_common::{CameraPose, Waypoint};

use crate::config::MarkerConfig;
use crate::device::{BlendFactor, Capability, DeviceError, DeviceState, GraphicsDevice, TextureId};
use crate::layout::{MARKER_QUAD, MarkerLayout};
use crate::text::TextRenderer;

/// Holds the device for the duration of one marker draw.
///
/// Entering pushes the transform stack and snapshots [`DeviceState`] and the
/// bound texture; dropping restores both and pops, whether the draw returned
/// normally, bailed out with an error or unwound from a panic.
pub struct StateScope<'a, D: GraphicsDevice + ?Sized> {
    device: &'a mut D,
    saved: DeviceState,
    saved_texture: Option<TextureId>,
}

impl<'a, D: GraphicsDevice + ?Sized> StateScope<'a, D> {
    pub fn enter(device: &'a mut D) -> Self {
        let saved = device.state();
        let saved_texture = device.bound_texture();
        device.push_matrix();
        Self {
            device,
            saved,
            saved_texture,
        }
    }
}

impl<D: GraphicsDevice + ?Sized> Deref for StateScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: GraphicsDevice + ?Sized> DerefMut for StateScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: GraphicsDevice + ?Sized> Drop for StateScope<'_, D> {
    fn drop(&mut self) {
        self.device.apply_state(&self.saved);
        self.device.restore_texture(self.saved_texture.as_ref());
        self.device.pop_matrix();
    }
}

/// Draws waypoints as camera-facing markers with a distance label.
///
/// Stateless between calls; the same renderer can draw any number of
/// waypoints per frame in any order.
#[derive(Debug, Clone, Default)]
pub struct MarkerRenderer {
    config: MarkerConfig,
}

impl MarkerRenderer {
    pub fn new(config: MarkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Compute the layout for a waypoint without drawing it.
    pub fn layout(&self, waypoint: &Waypoint, camera: &CameraPose) -> MarkerLayout {
        MarkerLayout::compute(waypoint, camera, &self.config)
    }

    /// Draw one waypoint for the current frame.
    ///
    /// Assumes the host has set up its view and projection. Errors come only
    /// from the device or text collaborators; device state is restored either
    /// way.
    pub fn render<F>(
        &self,
        device: &mut dyn GraphicsDevice,
        font: &F,
        waypoint: &Waypoint,
        camera: &CameraPose,
    ) -> Result<(), DeviceError>
    where
        F: TextRenderer + ?Sized,
    {
        let _span = tracing::trace_span!("render_waypoint", name = waypoint.name()).entered();
        let layout = self.layout(waypoint, camera);
        tracing::trace!(
            distance = layout.distance,
            final_alpha = layout.final_alpha,
            "marker layout"
        );

        let mut scope = StateScope::enter(device);
        scope.set_capability(Capability::CullFace, false);
        scope.set_capability(Capability::DepthTest, false);
        scope.set_capability(Capability::Lighting, false);
        scope.set_capability(Capability::Blend, true);
        scope.set_capability(Capability::Texture2d, true);

        scope.translate(layout.translation);
        for rotation in &layout.rotations {
            scope.rotate(rotation.degrees, rotation.axis);
        }

        scope.set_blend_func(BlendFactor::ConstantAlpha, BlendFactor::OneMinusConstantAlpha);
        let color = layout.color.extend(1.0).to_array();
        let label_width = font.string_width(&layout.label);
        let label_origin = Vec2::new(-label_width / 2.0, self.config.label_baseline);

        for pass in layout.passes {
            scope.set_capability(Capability::DepthTest, pass.depth_test);
            scope.set_blend_color([1.0, 1.0, 1.0, pass.blend_alpha]);
            scope.set_color(color);
            // The text renderer binds its own atlas, so rebind every pass.
            scope.bind_texture(&self.config.texture);
            scope.draw_triangles(&MARKER_QUAD)?;

            scope.scale(Vec3::splat(self.config.label_scale));
            scope.rotate(180.0, Vec3::Z);
            font.draw_string(
                &mut *scope,
                &layout.label,
                label_origin,
                waypoint.color_rgb(),
            )?;
            scope.rotate(180.0, Vec3::Z);
            scope.scale(Vec3::splat(self.config.label_scale.recip()));
        }

        Ok(())
    }
}
