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

//! Collects visible lights into the fixed-capacity arrays shaders read.

use super::ltc_lut::LtcAreaLightLut;
use prism_core::math::{Vec4, FRAC_1_PI};
use prism_core::renderer::{
    keywords, properties, Command, CommandStream, GraphicsDevice, ImmediateMesh, LightType,
    LightingSettings, MaterialInstance, ResourceError, ShadowProvider, ShadowSettings,
    VisibilitySet, VisibleLight,
};
use std::sync::Arc;

/// The maximum number of directional lights shaded per camera.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
/// The maximum number of point, spot and area lights shaded per camera.
pub const MAX_OTHER_LIGHTS: usize = 64;

const MIN_RANGE_SQUARED: f32 = 1e-5;
const MIN_SPOT_ANGLE_RANGE: f32 = 0.001;

/// How a visible light is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightClass {
    /// Shaded from the directional arrays.
    Directional,
    /// Shaded from the other-light arrays without a cone.
    Point,
    /// Shaded from the other-light arrays with a cone.
    Spot,
    /// Shaded from the other-light arrays with the LTC lookup table.
    Area,
}

impl LightClass {
    /// Classifies a visible light. Spot lights carrying area metadata are area lights.
    pub fn of(light: &VisibleLight) -> Self {
        match light.light {
            LightType::Directional(_) => LightClass::Directional,
            LightType::Point(_) => LightClass::Point,
            LightType::Spot(_) if light.area.is_some() => LightClass::Area,
            LightType::Spot(_) => LightClass::Spot,
            LightType::Area(_) => LightClass::Area,
        }
    }
}

/// Packs a rendering-layer mask into a float lane, bit for bit.
#[inline]
pub fn pack_layer_mask(mask: u32) -> f32 {
    f32::from_bits(mask)
}

/// The per-frame light shading arrays.
///
/// Only the first `directional_count` / `other_count` entries are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRecord {
    /// The number of directional lights stored.
    pub directional_count: usize,
    /// Final colors of directional lights.
    pub directional_colors: [Vec4; MAX_DIRECTIONAL_LIGHTS],
    /// Light directions, with the layer mask packed in `w`.
    pub directional_directions_and_masks: [Vec4; MAX_DIRECTIONAL_LIGHTS],
    /// Shadow data reserved by the shadow provider.
    pub directional_shadow_data: [Vec4; MAX_DIRECTIONAL_LIGHTS],

    /// The number of point, spot and area lights stored.
    pub other_count: usize,
    /// Final colors.
    pub other_colors: [Vec4; MAX_OTHER_LIGHTS],
    /// World positions, with `1 / range^2` in `w`.
    pub other_positions: [Vec4; MAX_OTHER_LIGHTS],
    /// Light directions (zero for point lights), with the layer mask packed in `w`.
    pub other_directions_and_masks: [Vec4; MAX_OTHER_LIGHTS],
    /// Spot falloff `(scale, bias)`; area lights add their half extents in `zw`.
    pub other_spot_angles: [Vec4; MAX_OTHER_LIGHTS],
    /// Area-light local X axes (`w = 1` marks an area light).
    pub other_area_x: [Vec4; MAX_OTHER_LIGHTS],
    /// Area-light local Y axes.
    pub other_area_y: [Vec4; MAX_OTHER_LIGHTS],
    /// Shadow data reserved by the shadow provider.
    pub other_shadow_data: [Vec4; MAX_OTHER_LIGHTS],
}

impl Default for LightRecord {
    fn default() -> Self {
        Self {
            directional_count: 0,
            directional_colors: [Vec4::ZERO; MAX_DIRECTIONAL_LIGHTS],
            directional_directions_and_masks: [Vec4::ZERO; MAX_DIRECTIONAL_LIGHTS],
            directional_shadow_data: [Vec4::ZERO; MAX_DIRECTIONAL_LIGHTS],
            other_count: 0,
            other_colors: [Vec4::ZERO; MAX_OTHER_LIGHTS],
            other_positions: [Vec4::ZERO; MAX_OTHER_LIGHTS],
            other_directions_and_masks: [Vec4::ZERO; MAX_OTHER_LIGHTS],
            other_spot_angles: [Vec4::ZERO; MAX_OTHER_LIGHTS],
            other_area_x: [Vec4::ZERO; MAX_OTHER_LIGHTS],
            other_area_y: [Vec4::ZERO; MAX_OTHER_LIGHTS],
            other_shadow_data: [Vec4::ZERO; MAX_OTHER_LIGHTS],
        }
    }
}

impl LightRecord {
    /// Publishes the counts, and the arrays of every non-empty category.
    pub fn publish(&self, commands: &mut CommandStream) {
        commands.set_global_int(
            properties::DIRECTIONAL_LIGHT_COUNT,
            self.directional_count as i32,
        );
        if self.directional_count > 0 {
            commands.set_global_vector_array(
                properties::DIRECTIONAL_LIGHT_COLORS,
                &self.directional_colors,
            );
            commands.set_global_vector_array(
                properties::DIRECTIONAL_LIGHT_DIRECTIONS_AND_MASKS,
                &self.directional_directions_and_masks,
            );
            commands.set_global_vector_array(
                properties::DIRECTIONAL_LIGHT_SHADOW_DATA,
                &self.directional_shadow_data,
            );
        }

        commands.set_global_int(properties::OTHER_LIGHT_COUNT, self.other_count as i32);
        if self.other_count > 0 {
            let arrays = [
                (properties::OTHER_LIGHT_COLORS, &self.other_colors),
                (properties::OTHER_LIGHT_POSITIONS, &self.other_positions),
                (
                    properties::OTHER_LIGHT_DIRECTIONS_AND_MASKS,
                    &self.other_directions_and_masks,
                ),
                (properties::OTHER_LIGHT_SPOT_ANGLES, &self.other_spot_angles),
                (properties::OTHER_LIGHT_AREA_X, &self.other_area_x),
                (properties::OTHER_LIGHT_AREA_Y, &self.other_area_y),
                (properties::OTHER_LIGHT_SHADOW_DATA, &self.other_shadow_data),
            ];
            for (property, values) in arrays {
                commands.set_global_vector_array(property, values);
            }
        }
    }
}

/// An area light kept this frame, remembered for emitter drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AggregatedAreaLight {
    light: VisibleLight,
    slot: usize,
}

/// Builds the light shading arrays and the per-object light index map.
///
/// The aggregator also owns the area-light lookup table, which it builds the
/// first time an area light is kept and caches until [`LightAggregator::teardown`].
#[derive(Debug, Default)]
pub struct LightAggregator {
    record: LightRecord,
    area_lights: Vec<AggregatedAreaLight>,
    ltc_lut: LtcAreaLightLut,
}

/// Per-camera inputs of [`LightAggregator::setup`].
#[derive(Debug, Clone, Copy)]
pub struct LightingInputs<'a> {
    /// Forwarded to the shadow provider.
    pub shadow_settings: &'a ShadowSettings,
    /// Builds and publishes the per-object light index map.
    pub per_object_lighting: bool,
    /// Lights whose rendering-layer mask does not intersect this are skipped.
    pub layer_mask: u32,
}

impl LightAggregator {
    /// Creates an aggregator with the analytic area-light lookup table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator with a prepared area-light lookup table.
    pub fn with_ltc_lut(ltc_lut: LtcAreaLightLut) -> Self {
        Self {
            ltc_lut,
            ..Self::default()
        }
    }

    /// Aggregates the visible lights, reserves shadows and publishes the arrays.
    ///
    /// Lights are visited once, in visibility order. A light whose category is
    /// full, or whose layer mask misses `layer_mask`, is skipped and maps to `-1`.
    /// Directional lights always map to `-1` because per-object indices address the
    /// other-light arrays only.
    pub fn setup(
        &mut self,
        commands: &mut CommandStream,
        visibility: &mut VisibilitySet,
        shadows: &mut dyn ShadowProvider,
        device: &dyn GraphicsDevice,
        inputs: LightingInputs<'_>,
    ) -> Result<(), ResourceError> {
        commands.begin_sample("Lighting");
        shadows.setup(visibility, inputs.shadow_settings);

        self.record.directional_count = 0;
        self.record.other_count = 0;
        self.area_lights.clear();

        let mut index_map: Option<Vec<i32>> = inputs
            .per_object_lighting
            .then(|| Vec::with_capacity(visibility.light_index_map_len()));

        for (visible_index, light) in visibility.visible_lights.iter().enumerate() {
            let mut slot = -1;
            if light.rendering_layer_mask & inputs.layer_mask != 0 {
                match LightClass::of(light) {
                    LightClass::Directional => {
                        if self.record.directional_count < MAX_DIRECTIONAL_LIGHTS {
                            self.store_directional(light, visible_index, shadows);
                        }
                    }
                    class => {
                        if self.record.other_count < MAX_OTHER_LIGHTS {
                            slot = self.store_other(class, light, visible_index, shadows) as i32;
                        }
                    }
                }
            }
            if let Some(map) = index_map.as_mut() {
                map.push(slot);
            }
        }

        match index_map {
            Some(mut map) => {
                map.resize(visibility.light_index_map_len(), -1);
                visibility.set_light_index_map(Arc::from(map));
                commands.set_keyword(keywords::LIGHTS_PER_OBJECT, true);
            }
            None => {
                visibility.clear_light_index_map();
                commands.set_keyword(keywords::LIGHTS_PER_OBJECT, false);
            }
        }

        if !self.area_lights.is_empty() {
            self.ltc_lut.ensure(device)?;
            self.ltc_lut.bind(commands);
        }

        self.record.publish(commands);
        log::trace!(
            "Aggregated {} directional and {} other lights ({} area)",
            self.record.directional_count,
            self.record.other_count,
            self.area_lights.len()
        );

        shadows.render(commands);
        commands.end_sample("Lighting");
        Ok(())
    }

    fn store_directional(
        &mut self,
        light: &VisibleLight,
        visible_index: usize,
        shadows: &mut dyn ShadowProvider,
    ) {
        let index = self.record.directional_count;
        let forward = light.local_to_world.cols[2].truncate();
        let direction = (-forward).normalize();

        self.record.directional_colors[index] = light.light.final_color().to_vec4();
        self.record.directional_directions_and_masks[index] =
            Vec4::from_vec3(direction, pack_layer_mask(light.rendering_layer_mask));
        self.record.directional_shadow_data[index] =
            shadows.reserve_directional_shadows(light, visible_index);
        self.record.directional_count += 1;
    }

    fn store_other(
        &mut self,
        class: LightClass,
        light: &VisibleLight,
        visible_index: usize,
        shadows: &mut dyn ShadowProvider,
    ) -> usize {
        let index = self.record.other_count;
        let transform = &light.local_to_world;
        let mask = pack_layer_mask(light.rendering_layer_mask);
        let range = light.light.range().unwrap_or(0.0);
        let inv_range_sq = 1.0 / (range * range).max(MIN_RANGE_SQUARED);

        self.record.other_colors[index] = light.light.final_color().to_vec4();
        self.record.other_positions[index] =
            Vec4::from_vec3(transform.cols[3].truncate(), inv_range_sq);

        let direction = (-transform.cols[2].truncate()).normalize();
        let (direction_and_mask, spot_angles, area_x, area_y) = match class {
            LightClass::Point => (
                Vec4::new(0.0, 0.0, 0.0, mask),
                Vec4::new(0.0, 1.0, 0.0, 0.0),
                Vec4::ZERO,
                Vec4::ZERO,
            ),
            LightClass::Spot => {
                let (inner, outer) = match light.light {
                    LightType::Spot(spot) => (spot.inner_cone_angle, spot.outer_cone_angle),
                    _ => (0.0, 0.0),
                };
                let inner_cos = inner.cos();
                let outer_cos = outer.cos();
                let falloff = 1.0 / (inner_cos - outer_cos).max(MIN_SPOT_ANGLE_RANGE);
                (
                    Vec4::from_vec3(direction, mask),
                    Vec4::new(falloff, -outer_cos * falloff, 0.0, 0.0),
                    Vec4::ZERO,
                    Vec4::ZERO,
                )
            }
            LightClass::Area | LightClass::Directional => {
                let half_extents = light
                    .area_settings()
                    .map(|area| area.half_extents)
                    .unwrap_or_default();
                self.area_lights.push(AggregatedAreaLight {
                    light: *light,
                    slot: index,
                });
                (
                    Vec4::from_vec3(direction, mask),
                    Vec4::new(0.0, 1.0, half_extents.x, half_extents.y),
                    Vec4::from_vec3(transform.cols[0].truncate().normalize(), 1.0),
                    Vec4::from_vec3(transform.cols[1].truncate().normalize(), 0.0),
                )
            }
        };

        self.record.other_directions_and_masks[index] = direction_and_mask;
        self.record.other_spot_angles[index] = spot_angles;
        self.record.other_area_x[index] = area_x;
        self.record.other_area_y[index] = area_y;
        self.record.other_shadow_data[index] = shadows.reserve_other_shadows(light, visible_index);
        self.record.other_count += 1;
        index
    }

    /// Draws an emitter quad for every kept area light.
    ///
    /// Disk emitters are drawn as the quad bounding the disk. Each quad uses its
    /// own material instance with base color `color * intensity / PI`. Nothing is
    /// drawn without an area-light material.
    pub fn draw_area_lights(&self, commands: &mut CommandStream, settings: &LightingSettings) {
        let Some(material) = settings.area_light_material else {
            if !self.area_lights.is_empty() {
                log::trace!("No area-light material configured; skipping emitter quads");
            }
            return;
        };

        for area in &self.area_lights {
            let Some(shape) = area.light.area_settings() else {
                continue;
            };
            let radiance = area.light.light.final_color() * FRAC_1_PI;
            commands.push(Command::DrawMesh {
                mesh: ImmediateMesh::quad(shape.half_extents),
                transform: area.light.local_to_world,
                material: MaterialInstance {
                    material,
                    base_color: radiance,
                },
            });
            log::trace!("Drew area-light emitter for slot {}", area.slot);
        }
    }

    /// Lets the shadow provider release what it acquired for this camera.
    pub fn cleanup(&mut self, commands: &mut CommandStream, shadows: &mut dyn ShadowProvider) {
        shadows.cleanup(commands);
    }

    /// The arrays built by the last [`LightAggregator::setup`].
    pub fn record(&self) -> &LightRecord {
        &self.record
    }

    /// The number of area lights kept by the last [`LightAggregator::setup`].
    pub fn area_light_count(&self) -> usize {
        self.area_lights.len()
    }

    /// The area-light lookup table.
    pub fn ltc_lut(&self) -> &LtcAreaLightLut {
        &self.ltc_lut
    }

    /// Destroys the area-light lookup table.
    pub fn teardown(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        self.ltc_lut.teardown(device)
    }
}
