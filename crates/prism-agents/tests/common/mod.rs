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

//! Test doubles shared by the orchestrator integration tests.

#![allow(dead_code)]

use prism_core::math::{Extent2D, Mat4, Vec3, Vec4};
use prism_core::renderer::{
    BlendMode, Camera, CameraId, Command, CommandStream, CullError, CullingParameters,
    DeviceFeature, FullscreenDraw, FullscreenProgram, GraphicsDevice, LightType, LoadOp,
    PointLight, PostProcessStack, RenderTarget, ResourceError, ShadowProvider, ShadowSettings,
    TextureDescriptor, TextureId, VisibilityHandle, VisibilityProvider, VisibilitySet,
    VisibleLight,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct DeviceState {
    next_id: usize,
    live: HashMap<TextureId, TextureDescriptor>,
    destroyed: usize,
    failing_creates: usize,
    failing_writes: usize,
    submitted: Vec<CommandStream>,
}

/// A device that keeps every submitted stream for inspection.
#[derive(Debug)]
pub struct RecordingDevice {
    state: Mutex<DeviceState>,
    copy_texture: AtomicBool,
}

impl RecordingDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(DeviceState::default()),
            copy_texture: AtomicBool::new(true),
        })
    }

    pub fn without_copy_texture() -> Arc<Self> {
        let device = Self::new();
        device.copy_texture.store(false, Ordering::SeqCst);
        device
    }

    /// Makes the next `count` texture creations fail.
    pub fn fail_next_creates(&self, count: usize) {
        self.state.lock().unwrap().failing_creates = count;
    }

    /// Makes the next `count` texture writes fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.state.lock().unwrap().failing_writes = count;
    }

    pub fn submitted(&self) -> Vec<CommandStream> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn last_submitted(&self) -> CommandStream {
        self.state
            .lock()
            .unwrap()
            .submitted
            .last()
            .cloned()
            .expect("a stream was submitted")
    }

    pub fn submit_count(&self) -> usize {
        self.state.lock().unwrap().submitted.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn destroyed_textures(&self) -> usize {
        self.state.lock().unwrap().destroyed
    }

    pub fn live_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .live
            .values()
            .filter_map(|desc| desc.label.as_ref().map(|label| label.to_string()))
            .collect();
        labels.sort();
        labels
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_creates > 0 {
            state.failing_creates -= 1;
            return Err(ResourceError::BackendError("out of memory".into()));
        }
        let id = TextureId(state.next_id);
        state.next_id += 1;
        state.live.insert(id, descriptor.clone());
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut state = self.state.lock().unwrap();
        state.live.remove(&id).ok_or(ResourceError::NotFound(id))?;
        state.destroyed += 1;
        Ok(())
    }

    fn write_texture(&self, id: TextureId, _layer: u32, data: &[u8]) -> Result<(), ResourceError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(ResourceError::BackendError("write rejected".into()));
        }
        let desc = state.live.get(&id).ok_or(ResourceError::NotFound(id))?;
        let expected = desc.layer_size_in_bytes();
        if data.len() != expected {
            return Err(ResourceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }

    fn supports_feature(&self, feature: DeviceFeature) -> bool {
        match feature {
            DeviceFeature::CopyTexture => self.copy_texture.load(Ordering::SeqCst),
        }
    }

    fn submit(&self, commands: CommandStream) {
        self.state.lock().unwrap().submitted.push(commands);
    }
}

/// Culls to a fixed light list, failing for chosen cameras.
#[derive(Debug, Default)]
pub struct ScriptedVisibility {
    pub lights: Vec<VisibleLight>,
    pub failing: HashSet<CameraId>,
    next_handle: u64,
}

impl ScriptedVisibility {
    pub fn with_lights(lights: Vec<VisibleLight>) -> Self {
        Self {
            lights,
            ..Self::default()
        }
    }

    pub fn failing_for(mut self, camera: CameraId) -> Self {
        self.failing.insert(camera);
        self
    }
}

impl VisibilityProvider for ScriptedVisibility {
    fn cull(
        &mut self,
        camera: &Camera,
        _parameters: &CullingParameters,
    ) -> Result<VisibilitySet, CullError> {
        if self.failing.contains(&camera.id) {
            return Err(CullError::ProviderFailed(format!(
                "no scene for {}",
                camera.name
            )));
        }
        self.next_handle += 1;
        Ok(VisibilitySet::new(
            VisibilityHandle(self.next_handle),
            self.lights.clone(),
        ))
    }
}

/// Counts shadow-provider calls. The counters survive the provider being boxed.
#[derive(Debug, Default, Clone)]
pub struct CountingShadows {
    pub setups: Arc<AtomicUsize>,
    pub renders: Arc<AtomicUsize>,
    pub cleanups: Arc<AtomicUsize>,
}

impl ShadowProvider for CountingShadows {
    fn setup(&mut self, _visibility: &VisibilitySet, _settings: &ShadowSettings) {
        self.setups.fetch_add(1, Ordering::SeqCst);
    }

    fn reserve_directional_shadows(&mut self, _light: &VisibleLight, _index: usize) -> Vec4 {
        Vec4::ZERO
    }

    fn reserve_other_shadows(&mut self, _light: &VisibleLight, _index: usize) -> Vec4 {
        Vec4::new(0.0, 0.0, 0.0, -1.0)
    }

    fn render(&mut self, _commands: &mut CommandStream) {
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn cleanup(&mut self, _commands: &mut CommandStream) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}

/// A post stack that copies its source to the camera target.
#[derive(Debug, Clone)]
pub struct CopyingPostStack {
    pub active: bool,
    pub composites: Arc<AtomicUsize>,
}

impl CopyingPostStack {
    pub fn new(active: bool) -> Self {
        Self {
            active,
            composites: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PostProcessStack for CopyingPostStack {
    fn setup(&mut self, _camera: &Camera, _buffer_size: Extent2D, _use_hdr: bool) {}

    fn is_active(&self) -> bool {
        self.active
    }

    fn composite(&mut self, commands: &mut CommandStream, source: RenderTarget) {
        self.composites.fetch_add(1, Ordering::SeqCst);
        commands.push(Command::DrawFullscreen(FullscreenDraw {
            program: FullscreenProgram::CopyColor,
            source: Some(source),
            destination: RenderTarget::CameraTarget,
            load: LoadOp::DontCare,
            blend: BlendMode::OPAQUE,
        }));
    }
}

pub fn game_camera(id: u64) -> Camera {
    Camera::new_perspective(
        CameraId(id),
        60.0_f32.to_radians(),
        Extent2D::new(1920, 1080),
        0.1,
        500.0,
    )
}

pub fn point_light_at(position: Vec3) -> VisibleLight {
    VisibleLight::new(
        LightType::Point(PointLight::default()),
        Mat4::from_translation(position),
    )
}

/// The descriptors of every temporary a stream acquires.
pub fn acquired(stream: &CommandStream) -> Vec<TextureDescriptor> {
    stream
        .commands()
        .iter()
        .filter_map(|command| match command {
            Command::AcquireTemporary { descriptor, .. } => Some(descriptor.clone()),
            _ => None,
        })
        .collect()
}

pub fn released(stream: &CommandStream) -> usize {
    stream
        .commands()
        .iter()
        .filter(|command| matches!(command, Command::ReleaseTemporary(_)))
        .count()
}

pub fn fullscreen_draws(stream: &CommandStream, program: FullscreenProgram) -> Vec<FullscreenDraw> {
    stream
        .commands()
        .iter()
        .filter_map(|command| match command {
            Command::DrawFullscreen(draw) if draw.program == program => Some(draw.clone()),
            _ => None,
        })
        .collect()
}

pub fn position(stream: &CommandStream, predicate: fn(&Command) -> bool) -> Option<usize> {
    stream.commands().iter().position(predicate)
}
