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

//! Deferred geometry: opaque surfaces are written to a geometry buffer and lit
//! in one full-screen pass.

use super::{
    bind_placeholders, clear, copy_attachments, draw_renderers, draw_skybox, GeometryFrame,
    GeometryLane, RenderSurfaceSet,
};
use prism_core::renderer::{
    properties, BlendMode, Command, CommandStream, FilterMode, FullscreenDraw, FullscreenProgram,
    LoadOp, RenderPath, RenderQueueRange, RenderTarget, RenderTargetBinding, ShaderPassTag,
    ShaderProperty, StoreOp, TextureDescriptor, TextureFormat,
};

/// The geometry-buffer channels, in binding order.
pub const GBUFFER_PROPERTIES: [ShaderProperty; 6] = [
    properties::GBUFFER_A,
    properties::GBUFFER_B,
    properties::GBUFFER_C,
    properties::GBUFFER_D,
    properties::GBUFFER_E,
    properties::GBUFFER_F,
];

const GBUFFER_LABELS: [&str; 6] = [
    "GBuffer A",
    "GBuffer B",
    "GBuffer C",
    "GBuffer D",
    "GBuffer E",
    "GBuffer F",
];

/// Draws opaque geometry into six geometry-buffer channels, then lights it.
///
/// Always renders into intermediate buffers: color, depth and the six channels.
/// Transparent geometry is drawn forward on top of the lit result.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredLane;

impl DeferredLane {
    /// Creates the lane.
    pub fn new() -> Self {
        Self
    }

    fn gbuffer_format(index: usize, frame: &GeometryFrame<'_>) -> TextureFormat {
        // Channel B stores normals and always needs the extra precision.
        if index == 1 {
            TextureFormat::Rgba16Float
        } else {
            frame.color_format()
        }
    }
}

impl GeometryLane for DeferredLane {
    fn strategy_name(&self) -> &'static str {
        "Deferred"
    }

    fn render_path(&self) -> RenderPath {
        RenderPath::Deferred
    }

    fn requires_intermediate_buffer(&self) -> bool {
        true
    }

    fn setup(&self, commands: &mut CommandStream, frame: &GeometryFrame<'_>) -> RenderSurfaceSet {
        commands.push(Command::SetViewProjection {
            view: frame.camera.view_matrix,
            projection: frame.camera.projection_matrix(),
        });

        let mut surfaces = RenderSurfaceSet::direct();
        surfaces.color =
            Some(commands.acquire_temporary(frame.color_descriptor("Camera Color Attachment")));
        surfaces.depth =
            Some(commands.acquire_temporary(frame.depth_descriptor("Camera Depth Attachment")));
        for (index, label) in GBUFFER_LABELS.into_iter().enumerate() {
            let descriptor = TextureDescriptor::render_target(
                label,
                frame.buffer_size,
                Self::gbuffer_format(index, frame),
                FilterMode::Linear,
            );
            surfaces.gbuffer.push(commands.acquire_temporary(descriptor));
        }

        commands.push(Command::SetRenderTargets(RenderTargetBinding {
            colors: surfaces
                .gbuffer
                .iter()
                .copied()
                .map(RenderTarget::Temporary)
                .collect(),
            depth: Some(surfaces.depth_target()),
            load: LoadOp::DontCare,
            store: StoreOp::Store,
        }));
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
        draw_renderers(
            commands,
            frame,
            RenderQueueRange::Opaque,
            vec![ShaderPassTag::UNLIT, ShaderPassTag::LIT_GBUFFER],
        );

        for (property, surface) in GBUFFER_PROPERTIES.iter().zip(&surfaces.gbuffer) {
            commands.set_global_texture(*property, RenderTarget::Temporary(*surface));
        }
        commands.push(Command::DrawFullscreen(FullscreenDraw {
            program: FullscreenProgram::DeferredLighting,
            source: None,
            destination: surfaces.color_target(),
            load: LoadOp::DontCare,
            blend: BlendMode::OPAQUE,
        }));
        commands.push(Command::SetRenderTargets(RenderTargetBinding::color_depth(
            surfaces.color_target(),
            surfaces.depth_target(),
            LoadOp::Load,
        )));

        draw_skybox(commands, frame);
        copy_attachments(commands, frame, surfaces);
        draw_renderers(
            commands,
            frame,
            RenderQueueRange::Transparent,
            vec![ShaderPassTag::UNLIT, ShaderPassTag::LIT_FORWARD],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_frame::*;
    use super::*;

    #[test]
    fn test_allocates_color_depth_and_six_gbuffers() {
        let camera = camera();
        let visibility = visibility();
        let mut frame = frame(&camera, &visibility);
        frame.use_hdr = false;
        let mut commands = CommandStream::new();
        let mut surfaces = DeferredLane::new().setup(&mut commands, &frame);
        DeferredLane::new().draw(&mut commands, &frame, &mut surfaces);

        assert_eq!(surfaces.gbuffer.len(), 6);
        assert_eq!(surfaces.allocated_count(), 8);
        assert_eq!(
            count(&commands, |c| matches!(c, Command::AcquireTemporary { .. })),
            8
        );
        let gbuffer_b = commands.commands().iter().find_map(|c| match c {
            Command::AcquireTemporary { descriptor, .. }
                if descriptor.label.as_deref() == Some("GBuffer B") =>
            {
                Some(descriptor.format)
            }
            _ => None,
        });
        assert_eq!(gbuffer_b, Some(TextureFormat::Rgba16Float));

        surfaces.release(&mut commands);
        assert_eq!(
            count(&commands, |c| matches!(c, Command::ReleaseTemporary(_))),
            8
        );
    }

    #[test]
    fn test_lighting_resolve_precedes_skybox_and_transparents() {
        let camera = camera();
        let visibility = visibility();
        let frame = frame(&camera, &visibility);
        let mut commands = CommandStream::new();
        let mut surfaces = DeferredLane::new().setup(&mut commands, &frame);
        let start = commands.commands().len();
        DeferredLane::new().draw(&mut commands, &frame, &mut surfaces);
        let drawn = &commands.commands()[start..];

        let position = |predicate: fn(&Command) -> bool| {
            drawn.iter().position(|c| predicate(c)).unwrap()
        };
        let lighting = position(|c| {
            matches!(c, Command::DrawFullscreen(d) if d.program == FullscreenProgram::DeferredLighting)
        });
        let skybox = position(|c| *c == Command::DrawSkybox);
        let transparent = position(|c| {
            matches!(c, Command::DrawRenderers(d) if d.queue == RenderQueueRange::Transparent)
        });
        assert!(lighting < skybox && skybox < transparent);

        match &drawn[0] {
            Command::DrawRenderers(draw) => {
                assert_eq!(draw.pass_tags[1], ShaderPassTag::LIT_GBUFFER)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
