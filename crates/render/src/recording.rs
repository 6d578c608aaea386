use std::fmt;

use glam::{Mat4, Vec3};

use crate::device::{
    BlendFactor, Capability, DeviceError, DeviceState, GraphicsDevice, TextureId, TexturedVertex,
};

/// A triangle submission together with the state it was drawn under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub vertices: Vec<TexturedVertex>,
    pub transform: Mat4,
    pub texture: Option<TextureId>,
    pub depth_test: bool,
    pub blend: bool,
    pub blend_alpha: f32,
    pub color: [f32; 4],
}

/// One call made against a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    PushMatrix,
    PopMatrix,
    Translate(Vec3),
    Rotate { degrees: f32, axis: Vec3 },
    Scale(Vec3),
    SetCapability(Capability, bool),
    BlendFunc(BlendFactor, BlendFactor),
    BlendColor([f32; 4]),
    Color([f32; 4]),
    BindTexture(TextureId),
    UnbindTexture,
    DrawTriangles(DrawCall),
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::PushMatrix => write!(f, "push_matrix"),
            DeviceCommand::PopMatrix => write!(f, "pop_matrix"),
            DeviceCommand::Translate(v) => {
                write!(f, "translate ({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
            }
            DeviceCommand::Rotate { degrees, axis } => write!(
                f,
                "rotate {degrees:.1}deg about ({}, {}, {})",
                axis.x, axis.y, axis.z
            ),
            DeviceCommand::Scale(v) => write!(f, "scale ({:.4}, {:.4}, {:.4})", v.x, v.y, v.z),
            DeviceCommand::SetCapability(cap, on) => {
                write!(f, "{} {cap:?}", if *on { "enable" } else { "disable" })
            }
            DeviceCommand::BlendFunc(src, dst) => write!(f, "blend_func {src:?} {dst:?}"),
            DeviceCommand::BlendColor(c) => write!(
                f,
                "blend_color ({:.3}, {:.3}, {:.3}, {:.3})",
                c[0], c[1], c[2], c[3]
            ),
            DeviceCommand::Color(c) => write!(
                f,
                "color ({:.3}, {:.3}, {:.3}, {:.3})",
                c[0], c[1], c[2], c[3]
            ),
            DeviceCommand::BindTexture(t) => write!(f, "bind_texture {t}"),
            DeviceCommand::UnbindTexture => write!(f, "unbind_texture"),
            DeviceCommand::DrawTriangles(d) => write!(
                f,
                "draw_triangles n={} texture={} depth_test={} blend_alpha={:.3}",
                d.vertices.len(),
                d.texture.as_ref().map_or("<none>", TextureId::as_str),
                d.depth_test,
                d.blend_alpha
            ),
        }
    }
}

/// In-memory device that tracks state and records every call.
///
/// Stands in for a GPU backend in tests and tooling. The transform stack
/// always has at least one entry.
#[derive(Debug, Clone)]
pub struct RecordingDevice {
    stack: Vec<Mat4>,
    state: DeviceState,
    bound_texture: Option<TextureId>,
    commands: Vec<DeviceCommand>,
    draws_attempted: usize,
    fail_on_draw: Option<usize>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::with_state(DeviceState::default())
    }
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: DeviceState) -> Self {
        Self {
            stack: vec![Mat4::IDENTITY],
            state,
            bound_texture: None,
            commands: Vec::new(),
            draws_attempted: 0,
            fail_on_draw: None,
        }
    }

    /// Make the `n`-th draw call (0-based, counted from now) fail.
    pub fn fail_on_draw(&mut self, n: usize) {
        self.fail_on_draw = Some(self.draws_attempted + n);
    }

    /// Current top of the transform stack.
    pub fn transform(&self) -> Mat4 {
        self.stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn draw_calls(&self) -> Vec<&DrawCall> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::DrawTriangles(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        if self.stack.is_empty() {
            self.stack.push(Mat4::IDENTITY);
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }
}

impl GraphicsDevice for RecordingDevice {
    fn push_matrix(&mut self) {
        let top = self.transform();
        self.stack.push(top);
        self.commands.push(DeviceCommand::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            tracing::warn!("pop_matrix on an empty transform stack ignored");
        }
        self.commands.push(DeviceCommand::PopMatrix);
    }

    fn translate(&mut self, offset: Vec3) {
        *self.top_mut() *= Mat4::from_translation(offset);
        self.commands.push(DeviceCommand::Translate(offset));
    }

    fn rotate(&mut self, degrees: f32, axis: Vec3) {
        *self.top_mut() *= Mat4::from_axis_angle(axis.normalize_or_zero(), degrees.to_radians());
        self.commands.push(DeviceCommand::Rotate { degrees, axis });
    }

    fn scale(&mut self, factor: Vec3) {
        *self.top_mut() *= Mat4::from_scale(factor);
        self.commands.push(DeviceCommand::Scale(factor));
    }

    fn set_capability(&mut self, cap: Capability, enabled: bool) {
        self.state.set_capability(cap, enabled);
        self.commands.push(DeviceCommand::SetCapability(cap, enabled));
    }

    fn is_enabled(&self, cap: Capability) -> bool {
        self.state.capability(cap)
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.blend_func = (src, dst);
        self.commands.push(DeviceCommand::BlendFunc(src, dst));
    }

    fn blend_func(&self) -> (BlendFactor, BlendFactor) {
        self.state.blend_func
    }

    fn set_blend_color(&mut self, rgba: [f32; 4]) {
        self.state.blend_color = rgba;
        self.commands.push(DeviceCommand::BlendColor(rgba));
    }

    fn blend_color(&self) -> [f32; 4] {
        self.state.blend_color
    }

    fn set_color(&mut self, rgba: [f32; 4]) {
        self.state.color = rgba;
        self.commands.push(DeviceCommand::Color(rgba));
    }

    fn color(&self) -> [f32; 4] {
        self.state.color
    }

    fn bind_texture(&mut self, texture: &TextureId) {
        self.bound_texture = Some(texture.clone());
        self.commands.push(DeviceCommand::BindTexture(texture.clone()));
    }

    fn unbind_texture(&mut self) {
        self.bound_texture = None;
        self.commands.push(DeviceCommand::UnbindTexture);
    }

    fn bound_texture(&self) -> Option<TextureId> {
        self.bound_texture.clone()
    }

    fn draw_triangles(&mut self, vertices: &[TexturedVertex]) -> Result<(), DeviceError> {
        let index = self.draws_attempted;
        self.draws_attempted += 1;
        if self.fail_on_draw == Some(index) {
            return Err(DeviceError::DrawFailed {
                reason: format!("injected failure on draw {index}"),
            });
        }

        self.commands.push(DeviceCommand::DrawTriangles(DrawCall {
            vertices: vertices.to_vec(),
            transform: self.transform(),
            texture: self.bound_texture.clone(),
            depth_test: self.state.depth_test,
            blend: self.state.blend,
            blend_alpha: self.state.blend_color[3],
            color: self.state.color,
        }));
        Ok(())
    }
}
