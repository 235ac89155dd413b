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

//! Per-pixel screen-space motion for temporal effects.

use super::GeometryFrame;
use prism_core::math::LinearRgba;
use prism_core::renderer::{
    properties, Command, CommandStream, DrawRenderers, FilterMode, LoadOp, PerObjectData,
    RenderQueueRange, RenderTarget, RenderTargetBinding, ShaderPassTag, SortingCriteria,
    SurfaceId, TextureDescriptor, TextureFormat,
};

const SAMPLE_NAME: &str = "VelocityBuffer";

/// Draws opaque geometry's motion vectors into a temporary surface.
#[derive(Debug, Default)]
pub struct VelocityLane {
    surface: Option<SurfaceId>,
}

impl VelocityLane {
    /// Creates the lane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders motion vectors and binds them globally.
    ///
    /// The render target is left bound to the motion-vector surface.
    pub fn render(&mut self, commands: &mut CommandStream, frame: &GeometryFrame<'_>) -> SurfaceId {
        commands.begin_sample(SAMPLE_NAME);
        let surface = commands.acquire_temporary(TextureDescriptor::render_target(
            "Motion Vectors",
            frame.buffer_size,
            TextureFormat::Rgba16Float,
            FilterMode::Linear,
        ));
        commands.push(Command::SetRenderTargets(RenderTargetBinding::color_only(
            RenderTarget::Temporary(surface),
            LoadOp::DontCare,
        )));
        commands.push(Command::ClearRenderTarget {
            clear_depth: false,
            clear_color: true,
            color: LinearRgba::TRANSPARENT,
        });
        commands.push(Command::DrawRenderers(DrawRenderers {
            visibility: frame.visibility.handle,
            sorting: SortingCriteria::CommonOpaque,
            queue: RenderQueueRange::Opaque,
            rendering_layer_mask: frame.rendering_layer_mask,
            pass_tags: vec![ShaderPassTag::MOTION_VECTORS],
            per_object_data: PerObjectData::MOTION_VECTORS,
            light_index_map: None,
            enable_dynamic_batching: false,
            enable_instancing: frame.instancing,
        }));
        commands.set_global_texture(
            properties::MOTION_VECTOR_TEXTURE,
            RenderTarget::Temporary(surface),
        );
        commands.end_sample(SAMPLE_NAME);
        self.surface = Some(surface);
        surface
    }

    /// The surface rendered this frame, if any.
    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Releases the surface. Does nothing if none is held.
    pub fn cleanup(&mut self, commands: &mut CommandStream) {
        if let Some(surface) = self.surface.take() {
            commands.release_temporary(surface);
        }
    }
}
