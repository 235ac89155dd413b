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

//! Forward geometry: lit shading happens while drawing each object.

use super::{
    bind_placeholders, clear, copy_attachments, draw_renderers, draw_skybox, GeometryFrame,
    GeometryLane, RenderSurfaceSet,
};
use prism_core::renderer::{
    Command, CommandStream, LoadOp, RenderPath, RenderQueueRange, RenderTarget,
    RenderTargetBinding, ShaderPassTag,
};

/// Draws the scene in a single lit pass per object.
///
/// Renders into an intermediate color/depth pair only when the frame asks for one;
/// otherwise draws straight into the camera target with no temporaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardLane;

impl ForwardLane {
    /// Creates the lane.
    pub fn new() -> Self {
        Self
    }
}

impl GeometryLane for ForwardLane {
    fn strategy_name(&self) -> &'static str {
        "Forward"
    }

    fn render_path(&self) -> RenderPath {
        RenderPath::Forward
    }

    fn requires_intermediate_buffer(&self) -> bool {
        false
    }

    fn setup(&self, commands: &mut CommandStream, frame: &GeometryFrame<'_>) -> RenderSurfaceSet {
        commands.push(Command::SetViewProjection {
            view: frame.camera.view_matrix,
            projection: frame.camera.projection_matrix(),
        });

        let mut surfaces = RenderSurfaceSet::direct();
        if frame.use_intermediate_buffer {
            surfaces.color =
                Some(commands.acquire_temporary(frame.color_descriptor("Camera Color Attachment")));
            surfaces.depth =
                Some(commands.acquire_temporary(frame.depth_descriptor("Camera Depth Attachment")));
            commands.push(Command::SetRenderTargets(RenderTargetBinding::color_depth(
                surfaces.color_target(),
                surfaces.depth_target(),
                LoadOp::DontCare,
            )));
        } else {
            commands.push(Command::SetRenderTargets(RenderTargetBinding::color_depth(
                RenderTarget::CameraTarget,
                RenderTarget::CameraTarget,
                LoadOp::Load,
            )));
        }

        clear(commands, frame);
        bind_placeholders(commands, frame);
        surfaces
    }

    fn draw(
        &self,
        commands: &mut CommandStream,
        frame: &GeometryFrame<'_>,
        surfaces: &mut RenderSurfaceSet,
    ) {
        let passes = vec![ShaderPassTag::UNLIT, ShaderPassTag::LIT_FORWARD];
        draw_renderers(commands, frame, RenderQueueRange::Opaque, passes.clone());
        draw_skybox(commands, frame);
        copy_attachments(commands, frame, surfaces);
        draw_renderers(commands, frame, RenderQueueRange::Transparent, passes);
    }
}
