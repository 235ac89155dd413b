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

//! Temporal anti-aliasing with per-camera history.

use super::jitter::{jittered_projection, JitterSequence};
use crate::persistent::PersistentTexture;
use ahash::AHashMap;
use prism_core::math::{Extent2D, Mat4, Vec2, Vec4};
use prism_core::renderer::{
    keywords, properties, AntiAliasingMode, BlendMode, Camera, CameraBufferSettings, CameraId,
    CameraKind, Command, CommandStream, DeviceFeature, FilterMode, FullscreenDraw,
    FullscreenProgram, GraphicsDevice, LoadOp, RenderTarget, ResourceError, TaaQuality,
    TextureDescriptor, TextureFormat, TextureId,
};

const SAMPLE_NAME: &str = "TAA";

/// Everything temporal accumulation remembers about one camera between frames.
#[derive(Debug, Default)]
pub struct TemporalState {
    sequence: JitterSequence,
    jitter: Vec2,
    jitter_uv: Vec2,
    jittered_projection: Mat4,
    view: Mat4,
    projection: Mat4,
    previous_view: Mat4,
    previous_projection: Mat4,
    history: [PersistentTexture; 2],
    read_index: usize,
    initialized: bool,
}

impl TemporalState {
    /// The jitter of the current frame, in pixels.
    pub fn jitter(&self) -> Vec2 {
        self.jitter
    }

    /// The jitter of the current frame, as a fraction of the buffer size.
    pub fn jitter_uv(&self) -> Vec2 {
        self.jitter_uv
    }

    /// The projection the current frame renders with.
    pub fn jittered_projection(&self) -> Mat4 {
        self.jittered_projection
    }

    /// The view-projection of the previous frame, without jitter.
    pub fn previous_view_projection(&self) -> Mat4 {
        self.previous_projection * self.previous_view
    }

    /// The index of the history texture holding the last resolved frame.
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// The live history textures.
    pub fn history(&self) -> [Option<TextureId>; 2] {
        [self.history[0].id(), self.history[1].id()]
    }

    fn release(&mut self, device: &dyn GraphicsDevice) -> Result<bool, ResourceError> {
        let mut released = false;
        for texture in &mut self.history {
            released |= texture.release(device)?;
        }
        self.read_index = 0;
        Ok(released)
    }
}

/// Jitters the projection of game cameras and blends each frame with its history.
///
/// State is keyed by camera, so two cameras never share a jitter sequence, a
/// history pair or the read/write parity between them.
#[derive(Debug, Default)]
pub struct TemporalAccumulator {
    states: AHashMap<CameraId, TemporalState>,
}

impl TemporalAccumulator {
    /// Creates an accumulator with no camera state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if temporal accumulation runs for `camera` under `settings`.
    pub fn is_active(settings: &CameraBufferSettings, camera: &Camera) -> bool {
        settings.anti_aliasing == AntiAliasingMode::Taa && camera.kind == CameraKind::Game
    }

    /// Advances the jitter and overrides the camera's projection.
    ///
    /// Returns `false`, recording nothing, when accumulation is inactive.
    pub fn setup(
        &mut self,
        commands: &mut CommandStream,
        camera: &Camera,
        buffer_size: Extent2D,
        settings: &CameraBufferSettings,
    ) -> bool {
        if !Self::is_active(settings, camera) {
            return false;
        }

        let state = self.states.entry(camera.id).or_default();
        let projection = camera.projection_matrix();
        if state.initialized {
            state.previous_view = state.view;
            state.previous_projection = state.projection;
        } else {
            state.previous_view = camera.view_matrix;
            state.previous_projection = projection;
            state.initialized = true;
        }
        state.view = camera.view_matrix;
        state.projection = projection;

        state.jitter = state.sequence.next_offset() * settings.taa.spread;
        state.jittered_projection = jittered_projection(projection, state.jitter, buffer_size);
        state.jitter_uv = Vec2::new(
            state.jitter.x / buffer_size.width.max(1) as f32,
            state.jitter.y / buffer_size.height.max(1) as f32,
        );

        commands.push(Command::SetViewProjection {
            view: camera.view_matrix,
            projection: state.jittered_projection,
        });
        true
    }

    /// Resolves `source` against the camera's history and writes the result back.
    ///
    /// Does nothing for cameras that are not game cameras.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        commands: &mut CommandStream,
        device: &dyn GraphicsDevice,
        camera: &Camera,
        source: RenderTarget,
        buffer_size: Extent2D,
        format: TextureFormat,
        settings: &CameraBufferSettings,
    ) -> Result<(), ResourceError> {
        if camera.kind != CameraKind::Game {
            return Ok(());
        }
        commands.begin_sample(SAMPLE_NAME);

        let state = self.states.entry(camera.id).or_default();
        let descriptor =
            TextureDescriptor::render_target("TAA History", buffer_size, format, FilterMode::Linear);
        let (first, first_created) = state.history[0].ensure(device, &descriptor)?;
        let (second, second_created) = state.history[1].ensure(device, &descriptor)?;
        let ids = [first, second];

        if first_created || second_created {
            // Fresh history would blend against undefined texels; start from this frame.
            state.read_index = 0;
            commands.push(Command::DrawFullscreen(FullscreenDraw {
                program: FullscreenProgram::CopyColor,
                source: Some(source),
                destination: RenderTarget::Texture(ids[0]),
                load: LoadOp::DontCare,
                blend: BlendMode::OPAQUE,
            }));
            log::debug!(
                "Created TAA history for camera {:?} at {}x{}",
                camera.id,
                buffer_size.width,
                buffer_size.height
            );
        }

        let read = state.read_index;
        let write = 1 - read;

        let inverse_view = state.view.inverse().unwrap_or_else(|| {
            log::warn!("Camera {:?} view matrix is not invertible", camera.id);
            Mat4::IDENTITY
        });
        let inverse_projection = state.jittered_projection.inverse().unwrap_or_else(|| {
            log::warn!("Camera {:?} projection is not invertible", camera.id);
            Mat4::IDENTITY
        });

        commands.set_global_matrix(properties::TAA_INV_VIEW, inverse_view);
        commands.set_global_matrix(properties::TAA_INV_PROJECTION, inverse_projection);
        commands.set_global_matrix(
            properties::TAA_PREV_VIEW_PROJECTION,
            state.previous_view_projection(),
        );
        commands.set_global_vector(
            properties::TAA_PARAMS,
            Vec4::new(
                state.jitter_uv.x,
                state.jitter_uv.y,
                settings.taa.feedback,
                0.0,
            ),
        );
        commands.set_global_texture(
            properties::TAA_HISTORY_TEXTURE,
            RenderTarget::Texture(ids[read]),
        );
        let quality = settings.taa.quality;
        commands.set_keyword(keywords::TAA_HIGH, quality == TaaQuality::High);
        commands.set_keyword(keywords::TAA_MEDIUM, quality == TaaQuality::Medium);
        commands.set_keyword(keywords::TAA_LOW, quality == TaaQuality::Low);

        let resolved = RenderTarget::Texture(ids[write]);
        commands.push(Command::DrawFullscreen(FullscreenDraw {
            program: FullscreenProgram::TemporalResolve,
            source: Some(source),
            destination: resolved,
            load: LoadOp::DontCare,
            blend: BlendMode::OPAQUE,
        }));
        if device.supports_feature(DeviceFeature::CopyTexture) {
            commands.push(Command::CopyTexture {
                source: resolved,
                destination: source,
            });
        } else {
            commands.push(Command::DrawFullscreen(FullscreenDraw {
                program: FullscreenProgram::CopyColor,
                source: Some(resolved),
                destination: source,
                load: LoadOp::DontCare,
                blend: BlendMode::OPAQUE,
            }));
        }
        state.read_index = write;

        commands.end_sample(SAMPLE_NAME);
        Ok(())
    }

    /// Destroys every camera's history textures. Calling it again does nothing.
    pub fn teardown(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        for (id, state) in &mut self.states {
            if state.release(device)? {
                log::debug!("Released TAA history for camera {id:?}");
            }
        }
        Ok(())
    }

    /// Forgets a camera, destroying its history textures.
    pub fn remove_camera(
        &mut self,
        device: &dyn GraphicsDevice,
        camera: CameraId,
    ) -> Result<(), ResourceError> {
        if let Some(mut state) = self.states.remove(&camera) {
            state.release(device)?;
        }
        Ok(())
    }

    /// The state of `camera`, if it has rendered with accumulation.
    pub fn state(&self, camera: CameraId) -> Option<&TemporalState> {
        self.states.get(&camera)
    }

    /// The number of cameras with temporal state.
    pub fn camera_count(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal_lane::JITTER_SAMPLE_COUNT;
    use crate::test_support::RecordingDevice;
    use prism_core::renderer::SurfaceId;

    fn game_camera(id: u64) -> Camera {
        Camera::new_perspective(CameraId(id), 1.0, Extent2D::new(64, 32), 0.1, 100.0)
    }

    fn taa_settings() -> CameraBufferSettings {
        CameraBufferSettings {
            anti_aliasing: AntiAliasingMode::Taa,
            ..CameraBufferSettings::default()
        }
    }

    const SIZE: Extent2D = Extent2D::new(64, 32);
    const SOURCE: RenderTarget = RenderTarget::Temporary(SurfaceId(0));

    fn frame(
        taa: &mut TemporalAccumulator,
        device: &RecordingDevice,
        camera: &Camera,
    ) -> CommandStream {
        let settings = taa_settings();
        let mut commands = CommandStream::new();
        assert!(taa.setup(&mut commands, camera, SIZE, &settings));
        taa.render(
            &mut commands,
            device,
            camera,
            SOURCE,
            SIZE,
            TextureFormat::Rgba16Float,
            &settings,
        )
        .unwrap();
        commands
    }

    fn resolve_destination(commands: &CommandStream) -> RenderTarget {
        commands
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::DrawFullscreen(draw)
                    if draw.program == FullscreenProgram::TemporalResolve =>
                {
                    Some(draw.destination)
                }
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_inactive_for_non_game_cameras_or_without_taa() {
        let mut taa = TemporalAccumulator::new();
        let mut commands = CommandStream::new();
        let mut scene_view = game_camera(1);
        scene_view.kind = CameraKind::SceneView;

        assert!(!taa.setup(&mut commands, &scene_view, SIZE, &taa_settings()));
        assert!(!taa.setup(
            &mut commands,
            &game_camera(1),
            SIZE,
            &CameraBufferSettings::default()
        ));
        assert!(commands.is_empty());
        assert_eq!(taa.camera_count(), 0);
    }

    #[test]
    fn test_setup_overrides_projection_with_jitter() {
        let mut taa = TemporalAccumulator::new();
        let camera = game_camera(1);
        let mut commands = CommandStream::new();
        taa.setup(&mut commands, &camera, SIZE, &taa_settings());

        let state = taa.state(camera.id).unwrap();
        assert_ne!(state.jittered_projection(), camera.projection_matrix());
        assert_eq!(state.jitter_uv().x, state.jitter().x / 64.0);
        assert_eq!(
            commands.commands(),
            &[Command::SetViewProjection {
                view: camera.view_matrix,
                projection: state.jittered_projection(),
            }]
        );
    }

    #[test]
    fn test_spread_scales_the_jitter() {
        let mut taa = TemporalAccumulator::new();
        let camera = game_camera(1);
        let mut settings = taa_settings();
        settings.taa.spread = 0.0;
        taa.setup(&mut CommandStream::new(), &camera, SIZE, &settings);
        let state = taa.state(camera.id).unwrap();
        assert_eq!(state.jitter(), Vec2::ZERO);
        assert_eq!(state.jittered_projection(), camera.projection_matrix());
    }

    #[test]
    fn test_wide_spread_stays_within_half_its_width() {
        let mut taa = TemporalAccumulator::new();
        let camera = game_camera(1);
        let mut settings = taa_settings();
        settings.taa.spread = 2.5;

        let mut widest: f32 = 0.0;
        for _ in 0..JITTER_SAMPLE_COUNT {
            taa.setup(&mut CommandStream::new(), &camera, SIZE, &settings);
            let jitter = taa.state(camera.id).unwrap().jitter();
            assert!(jitter.x.abs() <= 1.25 && jitter.y.abs() <= 1.25);
            widest = widest.max(jitter.x.abs()).max(jitter.y.abs());
        }
        // Wider than a pixel, so the spread really scaled the samples.
        assert!(widest > 0.5);
    }

    #[test]
    fn test_history_parity_alternates_per_frame() {
        let device = RecordingDevice::default();
        let mut taa = TemporalAccumulator::new();
        let camera = game_camera(1);

        let first = frame(&mut taa, &device, &camera);
        let history = taa.state(camera.id).unwrap().history();
        let [a, b] = history.map(Option::unwrap);
        assert_eq!(resolve_destination(&first), RenderTarget::Texture(b));
        assert_eq!(device.live_textures(), 2);

        let second = frame(&mut taa, &device, &camera);
        assert_eq!(resolve_destination(&second), RenderTarget::Texture(a));
        assert!(second.commands().contains(&Command::SetGlobalTexture {
            property: properties::TAA_HISTORY_TEXTURE,
            texture: RenderTarget::Texture(b),
        }));
        assert!(second.commands().contains(&Command::CopyTexture {
            source: RenderTarget::Texture(a),
            destination: SOURCE,
        }));
    }

    #[test]
    fn test_parity_is_independent_per_camera() {
        let device = RecordingDevice::default();
        let mut taa = TemporalAccumulator::new();
        let first_camera = game_camera(1);
        let second_camera = game_camera(2);

        frame(&mut taa, &device, &first_camera);
        frame(&mut taa, &device, &second_camera);
        assert_eq!(taa.state(first_camera.id).unwrap().read_index(), 1);
        assert_eq!(taa.state(second_camera.id).unwrap().read_index(), 1);
        assert_eq!(device.live_textures(), 4);
    }

    #[test]
    fn test_created_history_is_seeded_from_the_source() {
        let device = RecordingDevice::default();
        let mut taa = TemporalAccumulator::new();
        let camera = game_camera(1);
        let commands = frame(&mut taa, &device, &camera);
        let [a, _] = taa.state(camera.id).unwrap().history().map(Option::unwrap);

        assert!(commands
            .commands()
            .contains(&Command::DrawFullscreen(FullscreenDraw {
                program: FullscreenProgram::CopyColor,
                source: Some(SOURCE),
                destination: RenderTarget::Texture(a),
                load: LoadOp::DontCare,
                blend: BlendMode::OPAQUE,
            })));

        let steady = frame(&mut taa, &device, &camera);
        let seeds = steady
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::DrawFullscreen(d) if d.program == FullscreenProgram::CopyColor))
            .count();
        assert_eq!(seeds, 0);
    }

    #[test]
    fn test_quality_selects_exactly_one_keyword() {
        let device = RecordingDevice::default();
        let mut taa = TemporalAccumulator::new();
        let commands = frame(&mut taa, &device, &game_camera(1));
        let enabled: Vec<_> = commands
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::SetKeyword {
                    keyword,
                    enabled: true,
                } => Some(*keyword),
                _ => None,
            })
            .collect();
        assert_eq!(enabled, vec![keywords::TAA_MEDIUM]);
    }

    #[test]
    fn test_previous_view_projection_rolls_forward() {
        let device = RecordingDevice::default();
        let mut taa = TemporalAccumulator::new();
        let mut camera = game_camera(1);
        frame(&mut taa, &device, &camera);
        let first_view_projection = camera.projection_matrix() * camera.view_matrix;

        camera.view_matrix = Mat4::from_translation(prism_core::math::Vec3::new(0.0, 0.0, -3.0));
        frame(&mut taa, &device, &camera);
        assert_eq!(
            taa.state(camera.id).unwrap().previous_view_projection(),
            first_view_projection
        );
    }

    #[test]
    fn test_resize_recreates_history() {
        let device = RecordingDevice::default();
        let mut taa = TemporalAccumulator::new();
        let camera = game_camera(1);
        frame(&mut taa, &device, &camera);
        let before = taa.state(camera.id).unwrap().history();

        let settings = taa_settings();
        let mut commands = CommandStream::new();
        taa.setup(&mut commands, &camera, Extent2D::new(32, 16), &settings);
        taa.render(
            &mut commands,
            &device,
            &camera,
            SOURCE,
            Extent2D::new(32, 16),
            TextureFormat::Rgba16Float,
            &settings,
        )
        .unwrap();

        let after = taa.state(camera.id).unwrap().history();
        assert_ne!(before, after);
        assert_eq!(device.live_textures(), 2);
        let id = after[0].unwrap();
        assert_eq!(device.descriptor(id).unwrap().extent_2d(), Extent2D::new(32, 16));
    }

    #[test]
    fn test_teardown_is_idempotent_and_remove_camera_forgets_state() {
        let device = RecordingDevice::default();
        let mut taa = TemporalAccumulator::new();
        let camera = game_camera(1);
        frame(&mut taa, &device, &camera);

        taa.teardown(&device).unwrap();
        taa.teardown(&device).unwrap();
        assert_eq!(device.live_textures(), 0);
        assert_eq!(taa.state(camera.id).unwrap().history(), [None, None]);

        frame(&mut taa, &device, &camera);
        taa.remove_camera(&device, camera.id).unwrap();
        assert_eq!(device.live_textures(), 0);
        assert!(taa.state(camera.id).is_none());
    }
}
