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

//! Names of shading-visible global state, pass tags and material handles.
//!
//! Shader source and material loading live outside this crate. The pipeline only
//! refers to them through the names and opaque handles defined here.

use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The name of a global shader property (texture, vector, matrix, scalar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderProperty(pub &'static str);

impl fmt::Display for ShaderProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The name of a global shader keyword used to select a shader permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderKeyword(pub &'static str);

/// A tag selecting which shader pass of a material a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderPassTag(pub &'static str);

impl ShaderPassTag {
    /// Materials that ignore lighting.
    pub const UNLIT: Self = Self("SRPDefaultUnlit");
    /// The lit forward pass.
    pub const LIT_FORWARD: Self = Self("LitForward");
    /// The lit pass writing the geometry buffer.
    pub const LIT_GBUFFER: Self = Self("LitGBuffer");
    /// The pass writing per-pixel motion vectors.
    pub const MOTION_VECTORS: Self = Self("MotionVectors");
}

/// An opaque handle to a host-owned material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub usize);

/// A per-draw material instance: a base material with an overridden base color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialInstance {
    /// The material the instance derives from.
    pub material: MaterialId,
    /// The overridden base color.
    pub base_color: LinearRgba,
}

/// Full-screen programs the pipeline draws with a single procedural triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenProgram {
    /// Copies the source color to the destination.
    CopyColor,
    /// Copies the source depth to the destination depth.
    CopyDepth,
    /// Blends the intermediate color onto the camera target.
    FinalBlend,
    /// Integrates the split-sum BRDF into the lookup table.
    BrdfIntegration,
    /// Resolves the current frame against the temporal history.
    TemporalResolve,
    /// Shades the geometry buffer into the color attachment.
    DeferredLighting,
}

/// Global property names published by the pipeline.
#[allow(missing_docs)]
pub mod properties {
    use super::ShaderProperty;

    pub const BUFFER_SIZE: ShaderProperty = ShaderProperty("_CameraBufferSize");
    pub const CAMERA_COLOR_TEXTURE: ShaderProperty = ShaderProperty("_CameraColorTexture");
    pub const CAMERA_DEPTH_TEXTURE: ShaderProperty = ShaderProperty("_CameraDepthTexture");

    pub const GBUFFER_A: ShaderProperty = ShaderProperty("_GBufferA");
    pub const GBUFFER_B: ShaderProperty = ShaderProperty("_GBufferB");
    pub const GBUFFER_C: ShaderProperty = ShaderProperty("_GBufferC");
    pub const GBUFFER_D: ShaderProperty = ShaderProperty("_GBufferD");
    pub const GBUFFER_E: ShaderProperty = ShaderProperty("_GBufferE");
    pub const GBUFFER_F: ShaderProperty = ShaderProperty("_GBufferF");

    pub const DIRECTIONAL_LIGHT_COUNT: ShaderProperty = ShaderProperty("_DirectionalLightCount");
    pub const DIRECTIONAL_LIGHT_COLORS: ShaderProperty = ShaderProperty("_DirectionalLightColors");
    pub const DIRECTIONAL_LIGHT_DIRECTIONS_AND_MASKS: ShaderProperty =
        ShaderProperty("_DirectionalLightDirectionsAndMasks");
    pub const DIRECTIONAL_LIGHT_SHADOW_DATA: ShaderProperty =
        ShaderProperty("_DirectionalLightShadowData");

    pub const OTHER_LIGHT_COUNT: ShaderProperty = ShaderProperty("_OtherLightCount");
    pub const OTHER_LIGHT_COLORS: ShaderProperty = ShaderProperty("_OtherLightColors");
    pub const OTHER_LIGHT_POSITIONS: ShaderProperty = ShaderProperty("_OtherLightPositions");
    pub const OTHER_LIGHT_DIRECTIONS_AND_MASKS: ShaderProperty =
        ShaderProperty("_OtherLightDirectionsAndMasks");
    pub const OTHER_LIGHT_SPOT_ANGLES: ShaderProperty = ShaderProperty("_OtherLightSpotAngles");
    pub const OTHER_LIGHT_AREA_X: ShaderProperty = ShaderProperty("_OtherLightAreaX");
    pub const OTHER_LIGHT_AREA_Y: ShaderProperty = ShaderProperty("_OtherLightAreaY");
    pub const OTHER_LIGHT_SHADOW_DATA: ShaderProperty = ShaderProperty("_OtherLightShadowData");

    pub const LTC_DATA: ShaderProperty = ShaderProperty("_LtcData");
    pub const BRDF_LUT: ShaderProperty = ShaderProperty("_PreIntegratedBrdf");
    pub const MOTION_VECTOR_TEXTURE: ShaderProperty = ShaderProperty("_MotionVectorTexture");

    pub const TAA_HISTORY_TEXTURE: ShaderProperty = ShaderProperty("_HistoryTexture");
    pub const TAA_INV_VIEW: ShaderProperty = ShaderProperty("_InvViewMatrix");
    pub const TAA_INV_PROJECTION: ShaderProperty = ShaderProperty("_InvProjectionMatrix");
    pub const TAA_PREV_VIEW_PROJECTION: ShaderProperty = ShaderProperty("_PrevViewProjection");
    pub const TAA_PARAMS: ShaderProperty = ShaderProperty("_TaaParams");
}

/// Global keywords toggled by the pipeline.
#[allow(missing_docs)]
pub mod keywords {
    use super::ShaderKeyword;

    pub const LIGHTS_PER_OBJECT: ShaderKeyword = ShaderKeyword("_LIGHTS_PER_OBJECT");
    pub const TAA_LOW: ShaderKeyword = ShaderKeyword("_LOW_TAA");
    pub const TAA_MEDIUM: ShaderKeyword = ShaderKeyword("_MIDDLE_TAA");
    pub const TAA_HIGH: ShaderKeyword = ShaderKeyword("_HIGH_TAA");
}
