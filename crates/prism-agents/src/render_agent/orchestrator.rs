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

//! Defines the FrameOrchestrator, which drives every lane once per camera.

use super::frame::{buffer_size_vector, FrameContext};
use prism_core::math::{Extent2D, LinearRgba};
use prism_core::renderer::{
    properties, AntiAliasingMode, Camera, CameraId, CameraKind, Command, CommandStream,
    DeviceFeature, FilterMode, FullscreenDraw, FullscreenProgram, GraphicsDevice, LoadOp,
    NoShadows, PipelineSettings, PostProcessStack, RenderError, RenderTarget, RenderTargetBinding,
    ShadowProvider, TextureDescriptor, TextureDimension, TextureFormat, TextureId, TextureUsage,
    Viewport, VisibilityProvider,
};
use prism_lanes::light_lane::{LightAggregator, LightingInputs};
use prism_lanes::precompute_lane::BrdfLut;
use prism_lanes::render_lane::{lane_for, GeometryLane, VelocityLane};
use prism_lanes::temporal_lane::TemporalAccumulator;
use std::sync::Arc;

/// What happened to a camera passed to [`FrameOrchestrator::render_camera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraOutcome {
    /// The camera's stream was recorded and submitted.
    Submitted,
    /// The camera could not be culled. Nothing was submitted.
    Aborted,
}

/// The result of rendering a list of cameras.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// The index of the frame, starting at 0.
    pub frame: u64,
    /// The cameras whose streams were submitted, in render order.
    pub submitted: Vec<CameraId>,
    /// The cameras that were skipped, in render order.
    pub aborted: Vec<CameraId>,
}

type PostProcessingPolicy = Box<dyn Fn(&Camera) -> bool + Send>;

/// Renders cameras one at a time, recording each into its own command stream.
///
/// Per camera, the orchestrator culls, aggregates lights (and lets the shadow
/// provider render), prepares the BRDF table, sets up the geometry lane and the
/// temporal accumulator, draws, resolves and composites, then releases every
/// temporary and submits the stream once. A camera that cannot be culled is
/// skipped without affecting the others.
///
/// Long-lived resources (lookup tables, temporal history, the placeholder texture)
/// live until [`FrameOrchestrator::shutdown`].
pub struct FrameOrchestrator {
    device: Arc<dyn GraphicsDevice>,
    visibility: Box<dyn VisibilityProvider>,
    shadows: Box<dyn ShadowProvider>,
    post_processing: Option<Box<dyn PostProcessStack>>,
    post_processing_policy: PostProcessingPolicy,
    settings: PipelineSettings,
    geometry: Box<dyn GeometryLane>,
    lighting: LightAggregator,
    brdf_lut: BrdfLut,
    temporal: TemporalAccumulator,
    placeholder: TextureId,
    frame_count: u64,
}

impl FrameOrchestrator {
    /// Creates an orchestrator without shadows or post-processing.
    ///
    /// Uploads the neutral 1x1 texture bound where camera color and depth copies
    /// are unavailable.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        visibility: Box<dyn VisibilityProvider>,
        settings: PipelineSettings,
    ) -> Result<Self, RenderError> {
        let placeholder = create_placeholder(device.as_ref())?;
        let geometry = lane_for(settings.render_path);
        log::info!(
            "FrameOrchestrator: using the {} geometry lane",
            geometry.strategy_name()
        );

        Ok(Self {
            device,
            visibility,
            shadows: Box::new(NoShadows),
            post_processing: None,
            post_processing_policy: Box::new(|_| true),
            settings,
            geometry,
            lighting: LightAggregator::new(),
            brdf_lut: BrdfLut::new(),
            temporal: TemporalAccumulator::new(),
            placeholder,
            frame_count: 0,
        })
    }

    /// Replaces the shadow provider.
    pub fn with_shadows(mut self, shadows: Box<dyn ShadowProvider>) -> Self {
        self.shadows = shadows;
        self
    }

    /// Installs a post-process stack.
    pub fn with_post_processing(mut self, stack: Box<dyn PostProcessStack>) -> Self {
        self.post_processing = Some(stack);
        self
    }

    /// Decides per camera whether the post-process stack may run.
    ///
    /// Editors use this to inspect scene views without post effects.
    pub fn with_post_processing_policy(
        mut self,
        policy: impl Fn(&Camera) -> bool + Send + 'static,
    ) -> Self {
        self.post_processing_policy = Box::new(policy);
        self
    }

    /// Replaces the aggregator, to use fitted area-light tables.
    pub fn with_light_aggregator(mut self, lighting: LightAggregator) -> Self {
        self.lighting = lighting;
        self
    }

    /// The active pipeline settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Applies new pipeline settings from the next camera on.
    pub fn set_settings(&mut self, settings: PipelineSettings) {
        if settings.render_path != self.settings.render_path {
            self.geometry = lane_for(settings.render_path);
            log::debug!(
                "FrameOrchestrator: switched to the {} geometry lane",
                self.geometry.strategy_name()
            );
        }
        self.settings = settings;
    }

    /// The name of the active geometry lane.
    pub fn geometry_strategy(&self) -> &'static str {
        self.geometry.strategy_name()
    }

    /// The light aggregator, with the arrays of the last rendered camera.
    pub fn lighting(&self) -> &LightAggregator {
        &self.lighting
    }

    /// The temporal accumulator and its per-camera state.
    pub fn temporal(&self) -> &TemporalAccumulator {
        &self.temporal
    }

    /// The BRDF lookup texture, once built.
    pub fn brdf_lut(&self) -> Option<TextureId> {
        self.brdf_lut.texture()
    }

    /// The neutral 1x1 texture.
    pub fn placeholder(&self) -> TextureId {
        self.placeholder
    }

    /// Renders `cameras` in order and reports which were submitted.
    ///
    /// A camera that cannot be culled is listed as aborted and the others still
    /// render. A device error stops the frame: the failing camera's shadow
    /// provider is cleaned up, its stream is dropped and later cameras are not
    /// rendered.
    pub fn render(&mut self, cameras: &[Camera]) -> Result<FrameReport, RenderError> {
        let mut report = FrameReport {
            frame: self.frame_count,
            ..FrameReport::default()
        };
        for camera in cameras {
            match self.render_camera(camera)? {
                CameraOutcome::Submitted => report.submitted.push(camera.id),
                CameraOutcome::Aborted => report.aborted.push(camera.id),
            }
        }
        self.frame_count += 1;
        log::trace!(
            "Frame {}: {} cameras submitted, {} aborted",
            report.frame,
            report.submitted.len(),
            report.aborted.len()
        );
        Ok(report)
    }

    /// Records and submits one camera.
    pub fn render_camera(&mut self, camera: &Camera) -> Result<CameraOutcome, RenderError> {
        let parameters = match camera.culling_parameters(self.settings.shadows.max_distance) {
            Ok(parameters) => parameters,
            Err(err) => {
                log::warn!("Skipping camera '{}': {err}", camera.name);
                return Ok(CameraOutcome::Aborted);
            }
        };
        let visibility = match self.visibility.cull(camera, &parameters) {
            Ok(visibility) => visibility,
            Err(err) => {
                log::warn!("Skipping camera '{}': {err}", camera.name);
                return Ok(CameraOutcome::Aborted);
            }
        };

        let settings = self.settings;
        let device = Arc::clone(&self.device);
        let mut frame = FrameContext::new(camera, visibility, &settings);
        let mut commands = CommandStream::new();

        commands.begin_sample(camera.name.clone());
        commands.set_global_vector(properties::BUFFER_SIZE, buffer_size_vector(frame.buffer_size));

        if let Err(err) = self.record_camera(&mut commands, &mut frame, device.as_ref()) {
            // The shadow provider was set up for this camera even though nothing is submitted.
            self.lighting.cleanup(&mut commands, self.shadows.as_mut());
            log::error!("Dropping camera '{}': {err}", camera.name);
            return Err(err);
        }
        if settings.camera_buffer.anti_aliasing != AntiAliasingMode::Taa {
            self.temporal.teardown(device.as_ref())?;
        }

        commands.end_sample(camera.name.clone());
        log::trace!(
            "Camera '{}': {} commands at {}x{} ({})",
            camera.name,
            commands.commands().len(),
            frame.buffer_size.width,
            frame.buffer_size.height,
            self.geometry.strategy_name()
        );
        device.submit(commands);
        Ok(CameraOutcome::Submitted)
    }

    /// Records every lane for one culled camera, then releases its temporaries.
    fn record_camera(
        &mut self,
        commands: &mut CommandStream,
        frame: &mut FrameContext<'_>,
        device: &dyn GraphicsDevice,
    ) -> Result<(), RenderError> {
        let camera = frame.camera;
        let settings = self.settings;
        let buffer_settings = settings.camera_buffer;

        // Shadows and light arrays must be ready before any geometry samples them.
        self.lighting.setup(
            commands,
            &mut frame.visibility,
            self.shadows.as_mut(),
            device,
            LightingInputs {
                shadow_settings: &settings.shadows,
                per_object_lighting: settings.use_lights_per_object,
                layer_mask: camera.settings.light_layer_mask(),
            },
        )?;

        let post_allowed = (self.post_processing_policy)(camera);
        let post_active = match self.post_processing.as_mut() {
            Some(stack) if post_allowed => {
                stack.setup(camera, frame.buffer_size, frame.use_hdr);
                stack.is_active()
            }
            _ => false,
        };
        frame.resolve_intermediate(post_active, self.geometry.requires_intermediate_buffer());

        self.brdf_lut.setup(commands, device)?;

        let copy_supported = device.supports_feature(DeviceFeature::CopyTexture);
        let geometry_frame = frame.geometry_frame(&settings, self.placeholder, copy_supported);
        let mut surfaces = self.geometry.setup(commands, &geometry_frame);

        if frame.temporal_active {
            self.temporal
                .setup(commands, camera, frame.buffer_size, &buffer_settings);
        }
        if matches!(camera.kind, CameraKind::Game | CameraKind::SceneView) {
            self.lighting.draw_area_lights(commands, &settings.lighting);
        }
        self.geometry.draw(commands, &geometry_frame, &mut surfaces);

        let mut velocity = VelocityLane::new();
        if buffer_settings.motion_vectors {
            velocity.render(commands, &geometry_frame);
            commands.push(Command::SetRenderTargets(RenderTargetBinding::color_depth(
                surfaces.color_target(),
                surfaces.depth_target(),
                LoadOp::Load,
            )));
        }

        if frame.temporal_active {
            self.temporal.render(
                commands,
                device,
                camera,
                surfaces.color_target(),
                frame.buffer_size,
                frame.color_format(),
                &buffer_settings,
            )?;
        }

        match self.post_processing.as_mut() {
            Some(stack) if post_active => stack.composite(commands, surfaces.color_target()),
            _ if frame.use_intermediate_buffer => {
                draw_final(commands, camera, surfaces.color_target())
            }
            _ => {}
        }

        self.lighting.cleanup(commands, self.shadows.as_mut());
        velocity.cleanup(commands);
        surfaces.release(commands);
        Ok(())
    }

    /// Forgets a camera's temporal state and destroys its history textures.
    pub fn remove_camera(&mut self, camera: CameraId) -> Result<(), RenderError> {
        self.temporal.remove_camera(self.device.as_ref(), camera)?;
        Ok(())
    }

    /// Destroys every long-lived resource the orchestrator created.
    pub fn shutdown(mut self) -> Result<(), RenderError> {
        let device = Arc::clone(&self.device);
        self.temporal.teardown(device.as_ref())?;
        self.brdf_lut.teardown(device.as_ref())?;
        self.lighting.teardown(device.as_ref())?;
        device.destroy_texture(self.placeholder)?;
        log::info!("FrameOrchestrator shut down after {} frames", self.frame_count);
        Ok(())
    }
}

fn create_placeholder(device: &dyn GraphicsDevice) -> Result<TextureId, RenderError> {
    let descriptor = TextureDescriptor {
        label: Some("Missing".into()),
        size: Extent2D::new(1, 1).with_layers(1),
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8Unorm,
        filter: FilterMode::Nearest,
        usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
    };
    let id = device.create_texture(&descriptor)?;
    let gray = LinearRgba::GRAY;
    let texel = [gray.r, gray.g, gray.b, gray.a].map(|c| (c * 255.0).round() as u8);
    if let Err(err) = device.write_texture(id, 0, &texel) {
        device.destroy_texture(id)?;
        return Err(err.into());
    }
    Ok(id)
}

/// Blends the intermediate color onto the camera target.
fn draw_final(commands: &mut CommandStream, camera: &Camera, source: RenderTarget) {
    let blend = camera.settings.final_blend_mode;
    commands.push(Command::SetViewport(Viewport {
        x: 0.0,
        y: 0.0,
        width: camera.pixel_size.width as f32,
        height: camera.pixel_size.height as f32,
    }));
    commands.push(Command::DrawFullscreen(FullscreenDraw {
        program: FullscreenProgram::FinalBlend,
        source: Some(source),
        destination: RenderTarget::CameraTarget,
        load: blend.target_load_op(),
        blend,
    }));
}
