// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Geometry lanes: the forward and deferred ways of drawing a camera's scene.

mod deferred_lane;
mod forward_lane;
mod surfaces;
mod velocity_lane;

pub use deferred_lane::*;
pub use forward_lane::*;
pub use surfaces::*;
pub use velocity_lane::*;

use prism_core::math::{Extent2D, LinearRgba};
use prism_core::renderer::{
    properties, BlendMode, Camera, ClearFlags, Command, CommandStream, DrawRenderers, FilterMode,
    FullscreenDraw, FullscreenProgram, LoadOp, PerObjectData, RenderPath, RenderQueueRange,
    RenderTarget, RenderTargetBinding, ShaderPassTag, SortingCriteria, TextureDescriptor,
    TextureFormat, TextureId, VisibilitySet,
};

/// Everything a geometry lane needs to know about the camera it draws.
#[derive(Debug, Clone, Copy)]
pub struct GeometryFrame<'a> {
    /// The camera being rendered.
    pub camera: &'a Camera,
    /// The culling result, with the light index map already published.
    pub visibility: &'a VisibilitySet,
    /// The size of the intermediate buffers, in pixels.
    pub buffer_size: Extent2D,
    /// Whether color attachments use a high-dynamic-range format.
    pub use_hdr: bool,
    /// Whether the forward lane renders into intermediate buffers.
    pub use_intermediate_buffer: bool,
    /// The clear to perform, already limited for intermediate buffers.
    pub clear_flags: ClearFlags,
    /// Copies the color attachment into a sampled texture after opaque geometry.
    pub copy_color: bool,
    /// Copies the depth attachment into a sampled texture after opaque geometry.
    pub copy_depth: bool,
    /// Whether the device can copy textures directly.
    pub copy_texture_supported: bool,
    /// Draws with per-object light data and the light index map.
    pub per_object_lighting: bool,
    /// Allows dynamic batching.
    pub dynamic_batching: bool,
    /// Allows GPU instancing.
    pub instancing: bool,
    /// The rendering layers drawn.
    pub rendering_layer_mask: u32,
    /// The neutral 1x1 texture bound where copies are not available.
    pub placeholder: TextureId,
}

impl GeometryFrame<'_> {
    /// The intermediate color format.
    pub fn color_format(&self) -> TextureFormat {
        TextureFormat::default_color(self.use_hdr)
    }

    fn color_descriptor(&self, label: &'static str) -> TextureDescriptor {
        TextureDescriptor::render_target(
            label,
            self.buffer_size,
            self.color_format(),
            FilterMode::Linear,
        )
    }

    fn depth_descriptor(&self, label: &'static str) -> TextureDescriptor {
        TextureDescriptor::render_target(
            label,
            self.buffer_size,
            TextureFormat::Depth32Float,
            FilterMode::Nearest,
        )
    }
}

/// A strategy for drawing a camera's visible geometry.
///
/// The orchestrator picks one lane per pipeline through [`lane_for`] and drives it in
/// two steps: [`GeometryLane::setup`] allocates and clears the attachments, then
/// [`GeometryLane::draw`] records the opaque, skybox, copy and transparent passes.
pub trait GeometryLane: Send + Sync {
    /// Returns a human-readable identifier for this rendering strategy.
    fn strategy_name(&self) -> &'static str;

    /// The render path this lane implements.
    fn render_path(&self) -> RenderPath;

    /// Returns `true` if this lane always renders into intermediate buffers.
    fn requires_intermediate_buffer(&self) -> bool;

    /// Allocates, binds and clears the attachments, and binds placeholder textures.
    fn setup(&self, commands: &mut CommandStream, frame: &GeometryFrame<'_>) -> RenderSurfaceSet;

    /// Records the geometry passes into the attachments from [`GeometryLane::setup`].
    fn draw(
        &self,
        commands: &mut CommandStream,
        frame: &GeometryFrame<'_>,
        surfaces: &mut RenderSurfaceSet,
    );
}

/// Returns the geometry lane implementing `path`.
pub fn lane_for(path: RenderPath) -> Box<dyn GeometryLane> {
    match path {
        RenderPath::Forward => Box::new(ForwardLane::new()),
        RenderPath::Deferred => Box::new(DeferredLane::new()),
    }
}

fn clear(commands: &mut CommandStream, frame: &GeometryFrame<'_>) {
    let flags = frame.clear_flags;
    commands.push(Command::ClearRenderTarget {
        clear_depth: flags.clears_depth(),
        clear_color: flags.clears_color(),
        color: if flags.clears_color() {
            frame.camera.background_color
        } else {
            LinearRgba::TRANSPARENT
        },
    });
}

fn bind_placeholders(commands: &mut CommandStream, frame: &GeometryFrame<'_>) {
    let placeholder = RenderTarget::Texture(frame.placeholder);
    commands.set_global_texture(properties::CAMERA_COLOR_TEXTURE, placeholder);
    commands.set_global_texture(properties::CAMERA_DEPTH_TEXTURE, placeholder);
}

fn draw_renderers(
    commands: &mut CommandStream,
    frame: &GeometryFrame<'_>,
    queue: RenderQueueRange,
    pass_tags: Vec<ShaderPassTag>,
) {
    let mut per_object_data =
        PerObjectData::LIGHTMAPS | PerObjectData::LIGHT_PROBE | PerObjectData::REFLECTION_PROBES;
    let mut light_index_map = None;
    if frame.per_object_lighting {
        per_object_data |= PerObjectData::LIGHT_DATA | PerObjectData::LIGHT_INDICES;
        light_index_map = frame.visibility.light_index_map().cloned();
    }
    let sorting = match queue {
        RenderQueueRange::Opaque => SortingCriteria::CommonOpaque,
        RenderQueueRange::Transparent => SortingCriteria::CommonTransparent,
    };
    commands.push(Command::DrawRenderers(DrawRenderers {
        visibility: frame.visibility.handle,
        sorting,
        queue,
        rendering_layer_mask: frame.rendering_layer_mask,
        pass_tags,
        per_object_data,
        light_index_map,
        enable_dynamic_batching: frame.dynamic_batching,
        enable_instancing: frame.instancing,
    }));
}

fn draw_skybox(commands: &mut CommandStream, frame: &GeometryFrame<'_>) {
    if frame.camera.clear_flags == ClearFlags::Skybox {
        commands.push(Command::DrawSkybox);
    }
}

fn copy_into(
    commands: &mut CommandStream,
    frame: &GeometryFrame<'_>,
    source: RenderTarget,
    destination: RenderTarget,
    program: FullscreenProgram,
) {
    if frame.copy_texture_supported {
        commands.push(Command::CopyTexture {
            source,
            destination,
        });
    } else {
        commands.push(Command::DrawFullscreen(FullscreenDraw {
            program,
            source: Some(source),
            destination,
            load: LoadOp::DontCare,
            blend: BlendMode::OPAQUE,
        }));
    }
}

/// Copies the requested attachments into sampled textures and binds them.
fn copy_attachments(
    commands: &mut CommandStream,
    frame: &GeometryFrame<'_>,
    surfaces: &mut RenderSurfaceSet,
) {
    if !(frame.copy_color || frame.copy_depth) {
        return;
    }
    if frame.copy_color {
        let copy = commands.acquire_temporary(frame.color_descriptor("Camera Color Texture"));
        copy_into(
            commands,
            frame,
            surfaces.color_target(),
            RenderTarget::Temporary(copy),
            FullscreenProgram::CopyColor,
        );
        commands.set_global_texture(
            properties::CAMERA_COLOR_TEXTURE,
            RenderTarget::Temporary(copy),
        );
        surfaces.color_copy = Some(copy);
    }
    if frame.copy_depth {
        let copy = commands.acquire_temporary(frame.depth_descriptor("Camera Depth Texture"));
        copy_into(
            commands,
            frame,
            surfaces.depth_target(),
            RenderTarget::Temporary(copy),
            FullscreenProgram::CopyDepth,
        );
        commands.set_global_texture(
            properties::CAMERA_DEPTH_TEXTURE,
            RenderTarget::Temporary(copy),
        );
        surfaces.depth_copy = Some(copy);
    }
    if !frame.copy_texture_supported {
        // Full-screen copies rebound the render target.
        commands.push(Command::SetRenderTargets(RenderTargetBinding::color_depth(
            surfaces.color_target(),
            surfaces.depth_target(),
            LoadOp::Load,
        )));
    }
}

#[cfg(test)]
pub(crate) mod test_frame {
    use super::*;
    use prism_core::math::Extent2D;
    use prism_core::renderer::{CameraId, VisibilityHandle};

    pub fn camera() -> Camera {
        Camera::new_perspective(CameraId(3), 1.0, Extent2D::new(320, 180), 0.1, 100.0)
    }

    pub fn visibility() -> VisibilitySet {
        VisibilitySet::new(VisibilityHandle(11), Vec::new())
    }

    pub fn frame<'a>(camera: &'a Camera, visibility: &'a VisibilitySet) -> GeometryFrame<'a> {
        GeometryFrame {
            camera,
            visibility,
            buffer_size: camera.pixel_size,
            use_hdr: true,
            use_intermediate_buffer: true,
            clear_flags: camera.clear_flags.for_intermediate_buffer(),
            copy_color: false,
            copy_depth: false,
            copy_texture_supported: true,
            per_object_lighting: false,
            dynamic_batching: false,
            instancing: true,
            rendering_layer_mask: u32::MAX,
            placeholder: TextureId(99),
        }
    }

    pub fn count(commands: &CommandStream, predicate: impl Fn(&Command) -> bool) -> usize {
        commands.commands().iter().filter(|c| predicate(c)).count()
    }
}
