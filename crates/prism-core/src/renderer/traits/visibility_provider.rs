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

//! The culling collaborator.

use crate::renderer::api::{Camera, CullingParameters, VisibilitySet};
use crate::renderer::error::CullError;

/// Produces the visible renderers and lights of a camera.
pub trait VisibilityProvider: Send {
    /// Culls the scene for `camera`.
    ///
    /// `parameters.shadow_distance` bounds the shadow casters the provider gathers.
    fn cull(
        &mut self,
        camera: &Camera,
        parameters: &CullingParameters,
    ) -> Result<VisibilitySet, CullError>;
}
