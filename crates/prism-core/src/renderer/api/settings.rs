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

//! Pipeline-wide and per-camera settings.
//!
//! Every structure has a [`Default`] and deserializes with `#[serde(default)]`, so a
//! RON document only needs to name the fields it overrides.

use crate::renderer::api::shader::MaterialId;
use crate::renderer::api::target::BlendMode;
use crate::renderer::error::SettingsError;
use serde::{Deserialize, Serialize};

/// The lowest render scale the pipeline will size buffers with.
pub const MIN_RENDER_SCALE: f32 = 0.1;
/// The highest render scale the pipeline will size buffers with.
pub const MAX_RENDER_SCALE: f32 = 2.0;

/// Selects how opaque geometry is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderPath {
    /// Geometry is lit while it is drawn.
    #[default]
    Forward,
    /// Geometry writes a geometry buffer that is lit in a full-screen pass.
    Deferred,
}

/// The anti-aliasing technique applied to a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AntiAliasingMode {
    /// No anti-aliasing.
    #[default]
    None,
    /// Fast approximate anti-aliasing, applied by the post-process stack.
    Fxaa,
    /// Temporal accumulation with a jittered projection.
    Taa,
}

/// Selects one of the three temporal resolve permutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaaQuality {
    /// Cheapest resolve.
    Low,
    /// Balanced resolve.
    #[default]
    Medium,
    /// Highest-quality resolve.
    High,
}

/// Settings of the temporal accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaaSettings {
    /// Scales the sub-pixel jitter, in pixels.
    pub spread: f32,
    /// The weight of the history in the blended result, in `[0, 1]`.
    pub feedback: f32,
    /// The resolve permutation.
    pub quality: TaaQuality,
}

impl Default for TaaSettings {
    fn default() -> Self {
        Self {
            spread: 1.0,
            feedback: 0.9,
            quality: TaaQuality::Medium,
        }
    }
}

/// Settings describing the camera's intermediate buffers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraBufferSettings {
    /// Allows HDR intermediate buffers for cameras that request them.
    pub allow_hdr: bool,
    /// Copies the opaque color into a sampled texture for regular cameras.
    pub copy_color: bool,
    /// Copies the opaque color into a sampled texture for reflection cameras.
    pub copy_color_reflection: bool,
    /// Copies the opaque depth into a sampled texture for regular cameras.
    pub copy_depth: bool,
    /// Copies the opaque depth into a sampled texture for reflection cameras.
    pub copy_depth_reflection: bool,
    /// The pipeline-wide render scale.
    pub render_scale: f32,
    /// Renders a motion-vector surface after the opaque geometry.
    pub motion_vectors: bool,
    /// The anti-aliasing technique.
    pub anti_aliasing: AntiAliasingMode,
    /// Settings used when `anti_aliasing` is [`AntiAliasingMode::Taa`].
    pub taa: TaaSettings,
}

impl Default for CameraBufferSettings {
    fn default() -> Self {
        Self {
            allow_hdr: true,
            copy_color: false,
            copy_color_reflection: false,
            copy_depth: false,
            copy_depth_reflection: false,
            render_scale: 1.0,
            motion_vectors: false,
            anti_aliasing: AntiAliasingMode::None,
            taa: TaaSettings::default(),
        }
    }
}

/// Settings forwarded to the shadow provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// The maximum distance from the camera at which shadows are rendered.
    pub max_distance: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
        }
    }
}

/// Settings of the light aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// The material used to draw area-light emitter quads. Quads are skipped when unset.
    pub area_light_material: Option<MaterialId>,
}

/// The top-level pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Forward or deferred shading.
    pub render_path: RenderPath,
    /// Intermediate-buffer settings.
    pub camera_buffer: CameraBufferSettings,
    /// Shadow settings.
    pub shadows: ShadowSettings,
    /// Lighting settings.
    pub lighting: LightingSettings,
    /// Builds a per-object light index map instead of looping over every light per pixel.
    pub use_lights_per_object: bool,
    /// Allows the geometry draws to batch small meshes dynamically.
    pub use_dynamic_batching: bool,
    /// Allows the geometry draws to use GPU instancing.
    pub use_gpu_instancing: bool,
}

impl PipelineSettings {
    /// Parses settings from a RON document and validates them.
    ///
    /// # Examples
    ///
    /// ```
    /// use prism_core::renderer::api::{PipelineSettings, RenderPath};
    ///
    /// let settings = PipelineSettings::from_ron_str("(render_path: Deferred)").unwrap();
    /// assert_eq!(settings.render_path, RenderPath::Deferred);
    /// assert_eq!(settings.camera_buffer.render_scale, 1.0);
    /// ```
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        let settings: PipelineSettings =
            ron::from_str(source).map_err(SettingsError::Parse)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(SettingsError::Serialize)
    }

    /// Rejects values the pipeline cannot work with.
    ///
    /// Out-of-range render scales are not rejected; they are clamped when frames
    /// are sized.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let taa = &self.camera_buffer.taa;
        if !(0.0..=1.0).contains(&taa.feedback) {
            return Err(SettingsError::Invalid(format!(
                "taa feedback {} is outside [0, 1]",
                taa.feedback
            )));
        }
        if !taa.spread.is_finite() || taa.spread < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "taa spread {} must be a non-negative number",
                taa.spread
            )));
        }
        if self.shadows.max_distance.is_nan() || self.shadows.max_distance < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "shadow distance {} must be non-negative",
                self.shadows.max_distance
            )));
        }
        Ok(())
    }
}

/// How a camera combines its own render scale with the pipeline's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderScaleMode {
    /// Use the pipeline's scale.
    #[default]
    Inherit,
    /// Multiply the pipeline's scale by the camera's.
    Multiply,
    /// Use the camera's scale.
    Override,
}

/// Per-camera overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Whether this camera wants the opaque color copied (ANDed with the pipeline flag).
    pub copy_color: bool,
    /// Whether this camera wants the opaque depth copied (ANDed with the pipeline flag).
    pub copy_depth: bool,
    /// The rendering layers this camera draws.
    pub rendering_layer_mask: u32,
    /// Also restricts lights to `rendering_layer_mask`.
    pub mask_lights: bool,
    /// How `render_scale` combines with the pipeline scale.
    pub render_scale_mode: RenderScaleMode,
    /// The camera's render scale.
    pub render_scale: f32,
    /// The blend used when the intermediate color is drawn onto the camera target.
    pub final_blend_mode: BlendMode,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            copy_color: true,
            copy_depth: true,
            rendering_layer_mask: u32::MAX,
            mask_lights: false,
            render_scale_mode: RenderScaleMode::Inherit,
            render_scale: 1.0,
            final_blend_mode: BlendMode::OPAQUE,
        }
    }
}

impl CameraSettings {
    /// Resolves the configured (unclamped) render scale for this camera.
    pub fn resolve_render_scale(&self, pipeline_scale: f32) -> f32 {
        match self.render_scale_mode {
            RenderScaleMode::Inherit => pipeline_scale,
            RenderScaleMode::Multiply => pipeline_scale * self.render_scale,
            RenderScaleMode::Override => self.render_scale,
        }
    }

    /// Returns the layer mask lights are tested against.
    pub fn light_layer_mask(&self) -> u32 {
        if self.mask_lights {
            self.rendering_layer_mask
        } else {
            u32::MAX
        }
    }
}
