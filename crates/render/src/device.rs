use std::borrow::Cow;
use std::fmt;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable name of a texture the host has already loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(Cow<'static, str>);

impl TextureId {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vertex layout for textured triangle submission.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// Toggleable fixed-function state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    DepthTest,
    CullFace,
    Lighting,
    Texture2d,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Blend,
        Capability::DepthTest,
        Capability::CullFace,
        Capability::Lighting,
        Capability::Texture2d,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

/// Snapshot of everything the marker renderer may touch, apart from the
/// transform stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceState {
    pub blend: bool,
    pub depth_test: bool,
    pub cull_face: bool,
    pub lighting: bool,
    pub texture_2d: bool,
    pub blend_func: (BlendFactor, BlendFactor),
    pub blend_color: [f32; 4],
    pub color: [f32; 4],
}

impl Default for DeviceState {
    /// Typical world-pass state: depth, culling and lighting on, blending off.
    fn default() -> Self {
        Self {
            blend: false,
            depth_test: true,
            cull_face: true,
            lighting: true,
            texture_2d: true,
            blend_func: (BlendFactor::One, BlendFactor::Zero),
            blend_color: [0.0; 4],
            color: [1.0; 4],
        }
    }
}

impl DeviceState {
    pub fn capability(&self, cap: Capability) -> bool {
        match cap {
            Capability::Blend => self.blend,
            Capability::DepthTest => self.depth_test,
            Capability::CullFace => self.cull_face,
            Capability::Lighting => self.lighting,
            Capability::Texture2d => self.texture_2d,
        }
    }

    pub fn set_capability(&mut self, cap: Capability, enabled: bool) {
        let slot = match cap {
            Capability::Blend => &mut self.blend,
            Capability::DepthTest => &mut self.depth_test,
            Capability::CullFace => &mut self.cull_face,
            Capability::Lighting => &mut self.lighting,
            Capability::Texture2d => &mut self.texture_2d,
        };
        *slot = enabled;
    }
}

/// Errors reported by device or text backends.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("draw call failed: {reason}")]
    DrawFailed { reason: String },
    #[error("texture not available: {0}")]
    TextureUnavailable(TextureId),
}

/// Immediate-mode graphics device supplied by the host.
///
/// Angles are in degrees, matching the host's rotation convention. All
/// transform operations apply to the top of the transform stack.
pub trait GraphicsDevice {
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn translate(&mut self, offset: Vec3);
    fn rotate(&mut self, degrees: f32, axis: Vec3);
    fn scale(&mut self, factor: Vec3);

    fn set_capability(&mut self, cap: Capability, enabled: bool);
    fn is_enabled(&self, cap: Capability) -> bool;

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn blend_func(&self) -> (BlendFactor, BlendFactor);
    fn set_blend_color(&mut self, rgba: [f32; 4]);
    fn blend_color(&self) -> [f32; 4];
    fn set_color(&mut self, rgba: [f32; 4]);
    fn color(&self) -> [f32; 4];

    fn bind_texture(&mut self, texture: &TextureId);
    fn unbind_texture(&mut self);
    fn bound_texture(&self) -> Option<TextureId>;

    /// Submit a triangle list (three vertices per triangle) with the current state.
    fn draw_triangles(&mut self, vertices: &[TexturedVertex]) -> Result<(), DeviceError>;

    /// Capture the current state for later restoration.
    fn state(&self) -> DeviceState {
        DeviceState {
            blend: self.is_enabled(Capability::Blend),
            depth_test: self.is_enabled(Capability::DepthTest),
            cull_face: self.is_enabled(Capability::CullFace),
            lighting: self.is_enabled(Capability::Lighting),
            texture_2d: self.is_enabled(Capability::Texture2d),
            blend_func: self.blend_func(),
            blend_color: self.blend_color(),
            color: self.color(),
        }
    }

    fn apply_state(&mut self, state: &DeviceState) {
        for cap in Capability::ALL {
            self.set_capability(cap, state.capability(cap));
        }
        let (src, dst) = state.blend_func;
        self.set_blend_func(src, dst);
        self.set_blend_color(state.blend_color);
        self.set_color(state.color);
    }

    /// Rebind `texture`, or leave nothing bound when it is `None`.
    fn restore_texture(&mut self, texture: Option<&TextureId>) {
        match texture {
            Some(t) => self.bind_texture(t),
            None => self.unbind_texture(),
        }
    }
}
