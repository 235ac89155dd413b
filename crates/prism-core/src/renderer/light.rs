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

//! Defines light types consumed by the light aggregator.
//!
//! Orientation and position are not stored here: every visible light carries its
//! local-to-world transform (see [`VisibleLight`](crate::renderer::VisibleLight)),
//! and the aggregator derives position and axes from it.

use crate::math::{LinearRgba, Vec2};

/// A directional light source that illuminates from a uniform direction.
///
/// # Examples
///
/// ```
/// use prism_core::renderer::light::DirectionalLight;
/// use prism_core::math::LinearRgba;
///
/// let sun = DirectionalLight {
///     color: LinearRgba::new(1.0, 0.95, 0.8, 1.0),
///     intensity: 1.5,
/// };
/// assert_eq!(sun.final_color().g, 0.95 * 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// The intensity multiplier for the light.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
        }
    }
}

/// A point light source that emits light in all directions from a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// The maximum range of the light in world units.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
            range: 10.0,
        }
    }
}

/// A spot light source that emits light in a cone along its local -Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// The maximum range of the light in world units.
    pub range: f32,
    /// The half-angle in radians at which the light begins to fall off.
    pub inner_cone_angle: f32,
    /// The half-angle in radians at which the light is fully attenuated.
    pub outer_cone_angle: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: LinearRgba::WHITE,
            intensity: 1.0,
            range: 10.0,
            inner_cone_angle: 20.0_f32.to_radians(),
            outer_cone_angle: 30.0_f32.to_radians(),
        }
    }
}

/// The emitting shape of an area light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaShape {
    /// A rectangle spanned by the light's local X and Y axes.
    Rect,
    /// A disk in the light's local XY plane.
    Disk,
}

/// Area-light metadata: shape and half extents along local X and Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLightSettings {
    /// The emitting shape.
    pub shape: AreaShape,
    /// Half the width (x) and height (y) of the emitter, in world units.
    pub half_extents: Vec2,
}

/// An area light emitting from a surface facing its local -Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLight {
    /// The color of the light in linear RGB space.
    pub color: LinearRgba,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// The maximum range of the light in world units.
    pub range: f32,
    /// The emitter's shape and size.
    pub settings: AreaLightSettings,
}

/// An enum that encompasses all supported light types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightType {
    /// A directional light (sun-like).
    Directional(DirectionalLight),
    /// A point light (omnidirectional).
    Point(PointLight),
    /// A spot light (cone-shaped).
    Spot(SpotLight),
    /// An area light (surface emitter).
    Area(AreaLight),
}

impl LightType {
    /// Returns the color of the light.
    pub fn color(&self) -> LinearRgba {
        match self {
            LightType::Directional(l) => l.color,
            LightType::Point(l) => l.color,
            LightType::Spot(l) => l.color,
            LightType::Area(l) => l.color,
        }
    }

    /// Returns the intensity multiplier of the light.
    pub fn intensity(&self) -> f32 {
        match self {
            LightType::Directional(l) => l.intensity,
            LightType::Point(l) => l.intensity,
            LightType::Spot(l) => l.intensity,
            LightType::Area(l) => l.intensity,
        }
    }

    /// Returns the range of the light, or `None` for directional lights.
    pub fn range(&self) -> Option<f32> {
        match self {
            LightType::Directional(_) => None,
            LightType::Point(l) => Some(l.range),
            LightType::Spot(l) => Some(l.range),
            LightType::Area(l) => Some(l.range),
        }
    }

    /// Returns the color premultiplied by intensity, as uploaded to shaders.
    pub fn final_color(&self) -> LinearRgba {
        self.color() * self.intensity()
    }
}

impl DirectionalLight {
    /// Returns the color premultiplied by intensity.
    pub fn final_color(&self) -> LinearRgba {
        self.color * self.intensity
    }
}
