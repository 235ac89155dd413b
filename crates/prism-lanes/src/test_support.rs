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

//! A device double shared by the lane unit tests.

use prism_core::renderer::{
    CommandStream, DeviceFeature, GraphicsDevice, ResourceError, TextureDescriptor, TextureId,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct DeviceState {
    next_id: usize,
    live: HashMap<TextureId, TextureDescriptor>,
    uploads: Vec<(TextureId, u32, usize)>,
    failing_writes: usize,
}

/// Records texture lifetimes and uploads instead of talking to a GPU.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: Mutex<DeviceState>,
}

impl RecordingDevice {
    pub fn live_textures(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn descriptor(&self, id: TextureId) -> Option<TextureDescriptor> {
        self.state.lock().unwrap().live.get(&id).cloned()
    }

    /// Makes the next `count` texture writes fail with a backend error.
    pub fn fail_next_writes(&self, count: usize) {
        self.state.lock().unwrap().failing_writes = count;
    }

    /// `(texture, layer, bytes)` for every upload, in order.
    pub fn uploads(&self) -> Vec<(TextureId, u32, usize)> {
        self.state.lock().unwrap().uploads.clone()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        let mut state = self.state.lock().unwrap();
        let id = TextureId(state.next_id);
        state.next_id += 1;
        state.live.insert(id, descriptor.clone());
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut state = self.state.lock().unwrap();
        state
            .live
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound(id))
    }

    fn write_texture(&self, id: TextureId, layer: u32, data: &[u8]) -> Result<(), ResourceError> {
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
        state.uploads.push((id, layer, data.len()));
        Ok(())
    }

    fn supports_feature(&self, feature: DeviceFeature) -> bool {
        matches!(feature, DeviceFeature::CopyTexture)
    }

    fn submit(&self, _commands: CommandStream) {}
}
