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

//! Provides the backend-agnostic contracts of the Prism camera pipeline.
//!
//! This module defines the "common language" shared by the lanes and the frame
//! orchestrator: the command stream every step records into, the handles it refers
//! to, the settings it reads, and the collaborator traits (device, visibility,
//! shadows, post-processing) the host application implements.

pub mod api;
pub mod error;
pub mod light;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{CullError, RenderError, ResourceError, SettingsError};
pub use self::light::{
    AreaLight, AreaLightSettings, AreaShape, DirectionalLight, LightType, PointLight, SpotLight,
};
pub use self::traits::{
    DeviceFeature, GraphicsDevice, NoShadows, PostProcessStack, ShadowProvider,
    VisibilityProvider,
};
