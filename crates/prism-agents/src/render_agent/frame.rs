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

//! Per-camera frame sizing and the flags derived from it.

use prism_core::math::{Extent2D, Vec4};
use prism_core::renderer::{
    Camera, CameraKind, ClearFlags, PipelineSettings, RenderPath, TextureFormat,
    TextureId, VisibilitySet, MAX_RENDER_SCALE, MIN_RENDER_SCALE,
};
use prism_lanes::render_lane::GeometryFrame;
use prism_lanes::temporal_lane::TemporalAccumulator;

/// Scales inside this range render at native resolution.
const NATIVE_SCALE_RANGE: (f32, f32) = (0.99, 1.01);

/// Clamps a configured render scale to the supported range.
///
/// Non-finite scales render at native resolution.
pub fn effective_render_scale(configured: f32) -> f32 {
    if configured.is_finite() {
        configured.clamp(MIN_RENDER_SCALE, MAX_RENDER_SCALE)
    } else {
        1.0
    }
}

/// Returns `true` if `scale` differs enough from 1.0 to resize the buffers.
pub fn is_scaled(scale: f32) -> bool {
    scale < NATIVE_SCALE_RANGE.0 || scale > NATIVE_SCALE_RANGE.1
}

/// The buffer size for a camera of `pixel_size` rendered at `scale`.
///
/// Each axis is rounded down and kept at one pixel or more.
pub fn scaled_buffer_size(pixel_size: Extent2D, scale: f32) -> Extent2D {
    if !is_scaled(scale) {
        return pixel_size;
    }
    let axis = |pixels: u32| ((pixels as f32 * scale).floor() as u32).max(1);
    Extent2D::new(axis(pixel_size.width), axis(pixel_size.height))
}

/// The `(1/w, 1/h, w, h)` vector shaders read the buffer size from.
pub fn buffer_size_vector(size: Extent2D) -> Vec4 {
    let width = size.width.max(1) as f32;
    let height = size.height.max(1) as f32;
    Vec4::new(1.0 / width, 1.0 / height, width, height)
}

/// Everything decided about one camera's frame before any pass is recorded.
///
/// Lives for a single [`FrameOrchestrator::render_camera`](super::FrameOrchestrator::render_camera) call.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// The camera being rendered.
    pub camera: &'a Camera,
    /// The camera's culling result.
    pub visibility: VisibilitySet,
    /// The size of the intermediate buffers.
    pub buffer_size: Extent2D,
    /// The effective render scale.
    pub render_scale: f32,
    /// The geometry path.
    pub render_path: RenderPath,
    /// Whether color buffers are high-dynamic-range.
    pub use_hdr: bool,
    /// Copies color after opaque geometry.
    pub copy_color: bool,
    /// Copies depth after opaque geometry.
    pub copy_depth: bool,
    /// Whether temporal anti-aliasing runs for this camera.
    pub temporal_active: bool,
    /// Whether the post stack composites this camera.
    pub post_active: bool,
    /// Whether geometry renders into intermediate buffers.
    pub use_intermediate_buffer: bool,
    /// The clear to perform.
    pub clear_flags: ClearFlags,
}

impl<'a> FrameContext<'a> {
    /// Derives the frame's sizes and flags from the camera and pipeline settings.
    ///
    /// The intermediate-buffer decision waits for [`FrameContext::resolve_intermediate`].
    pub fn new(camera: &'a Camera, visibility: VisibilitySet, settings: &PipelineSettings) -> Self {
        let buffer = &settings.camera_buffer;
        let (copy_color, copy_depth) = if camera.kind == CameraKind::Reflection {
            (buffer.copy_color_reflection, buffer.copy_depth_reflection)
        } else {
            (
                buffer.copy_color && camera.settings.copy_color,
                buffer.copy_depth && camera.settings.copy_depth,
            )
        };

        let render_scale =
            effective_render_scale(camera.settings.resolve_render_scale(buffer.render_scale));

        Self {
            camera,
            visibility,
            buffer_size: scaled_buffer_size(camera.pixel_size, render_scale),
            render_scale,
            render_path: settings.render_path,
            use_hdr: buffer.allow_hdr && camera.allow_hdr,
            copy_color,
            copy_depth,
            temporal_active: TemporalAccumulator::is_active(buffer, camera),
            post_active: false,
            use_intermediate_buffer: false,
            clear_flags: camera.clear_flags,
        }
    }

    /// Returns `true` if the buffers are resized.
    pub fn is_scaled(&self) -> bool {
        is_scaled(self.render_scale)
    }

    /// Decides whether geometry renders into intermediate buffers.
    ///
    /// When it does, a skybox clear is downgraded to a color clear.
    pub fn resolve_intermediate(&mut self, post_active: bool, path_requires_intermediate: bool) {
        self.post_active = post_active;
        self.use_intermediate_buffer = self.is_scaled()
            || self.copy_color
            || self.copy_depth
            || post_active
            || self.temporal_active
            || path_requires_intermediate;
        self.clear_flags = if self.use_intermediate_buffer {
            self.camera.clear_flags.for_intermediate_buffer()
        } else {
            self.camera.clear_flags
        };
    }

    /// The color format of intermediate buffers.
    pub fn color_format(&self) -> TextureFormat {
        TextureFormat::default_color(self.use_hdr)
    }

    /// The view of this frame the geometry lanes draw from.
    pub fn geometry_frame(
        &self,
        settings: &PipelineSettings,
        placeholder: TextureId,
        copy_texture_supported: bool,
    ) -> GeometryFrame<'_> {
        GeometryFrame {
            camera: self.camera,
            visibility: &self.visibility,
            buffer_size: self.buffer_size,
            use_hdr: self.use_hdr,
            use_intermediate_buffer: self.use_intermediate_buffer,
            clear_flags: self.clear_flags,
            copy_color: self.copy_color,
            copy_depth: self.copy_depth,
            copy_texture_supported,
            per_object_lighting: settings.use_lights_per_object,
            dynamic_batching: settings.use_dynamic_batching,
            instancing: settings.use_gpu_instancing,
            rendering_layer_mask: self.camera.settings.rendering_layer_mask,
            placeholder,
        }
    }
}
