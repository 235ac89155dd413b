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

//! The shadow-map collaborator.
//!
//! Shadow rendering itself lives outside the pipeline. The light aggregator asks the
//! provider to reserve atlas space per light and to record its shadow passes before
//! any geometry that samples them.

use crate::math::Vec4;
use crate::renderer::api::{CommandStream, ShadowSettings, VisibilitySet, VisibleLight};

/// Schedules and renders shadow maps for the lights the aggregator keeps.
pub trait ShadowProvider: Send {
    /// Prepares for a new camera.
    fn setup(&mut self, visibility: &VisibilitySet, settings: &ShadowSettings);

    /// Reserves shadows for a directional light and returns its packed shadow data.
    fn reserve_directional_shadows(&mut self, light: &VisibleLight, visible_index: usize) -> Vec4;

    /// Reserves shadows for a point, spot or area light and returns its packed shadow data.
    fn reserve_other_shadows(&mut self, light: &VisibleLight, visible_index: usize) -> Vec4;

    /// Records the reserved shadow passes.
    fn render(&mut self, commands: &mut CommandStream);

    /// Releases anything acquired for this camera.
    fn cleanup(&mut self, commands: &mut CommandStream);
}

/// A shadow provider that never reserves anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShadows;

impl NoShadows {
    /// The shadow data of an unshadowed point, spot or area light.
    pub const NO_OTHER_SHADOW: Vec4 = Vec4::new(0.0, 0.0, 0.0, -1.0);
}

impl ShadowProvider for NoShadows {
    fn setup(&mut self, _visibility: &VisibilitySet, _settings: &ShadowSettings) {}

    fn reserve_directional_shadows(&mut self, _light: &VisibleLight, _index: usize) -> Vec4 {
        Vec4::ZERO
    }

    fn reserve_other_shadows(&mut self, _light: &VisibleLight, _index: usize) -> Vec4 {
        Self::NO_OTHER_SHADOW
    }

    fn render(&mut self, _commands: &mut CommandStream) {}

    fn cleanup(&mut self, _commands: &mut CommandStream) {}
}
