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

//! The camera description the pipeline renders from.

use crate::math::{Extent2D, LinearRgba, Mat4, PI};
use crate::renderer::api::settings::CameraSettings;
use crate::renderer::error::CullError;

/// A stable identifier for a camera, used to key per-camera state across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u64);

/// The role a camera plays in the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// The primary interactive view.
    Game,
    /// An editor scene-inspection view.
    SceneView,
    /// A camera rendering reflections (planar or probe).
    Reflection,
    /// A thumbnail or material preview.
    Preview,
}

/// Defines the type of camera projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    /// Perspective projection with field of view.
    Perspective {
        /// The vertical field of view in radians.
        fov_y_radians: f32,
    },
    /// Orthographic projection with view bounds.
    Orthographic {
        /// The width of the orthographic view volume.
        width: f32,
        /// The height of the orthographic view volume.
        height: f32,
    },
}

/// How the camera's targets are cleared before drawing.
///
/// Variants are ordered by how much they clear; `Skybox` clears depth and lets
/// the skybox cover the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClearFlags {
    /// Nothing is cleared.
    Nothing,
    /// Only depth is cleared.
    Depth,
    /// Depth and color are cleared to the background color.
    Color,
    /// Depth is cleared and a skybox is drawn behind the geometry.
    Skybox,
}

impl ClearFlags {
    /// Demotes the flags for an intermediate buffer, whose color is never covered
    /// by a skybox drawn into the final target.
    pub fn for_intermediate_buffer(self) -> Self {
        self.min(ClearFlags::Color)
    }

    /// Returns `true` if depth is cleared.
    pub fn clears_depth(self) -> bool {
        self >= ClearFlags::Depth
    }

    /// Returns `true` if color is cleared.
    pub fn clears_color(self) -> bool {
        self == ClearFlags::Color
    }
}

/// Everything the pipeline needs to know about one camera for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's stable identifier.
    pub id: CameraId,
    /// A debug name, used as the camera's profiling scope.
    pub name: String,
    /// The camera's role.
    pub kind: CameraKind,
    /// The projection type.
    pub projection: ProjectionType,
    /// The output size in pixels.
    pub pixel_size: Extent2D,
    /// The distance to the near clipping plane.
    pub z_near: f32,
    /// The distance to the far clipping plane.
    pub z_far: f32,
    /// The world-to-camera (view) matrix.
    pub view_matrix: Mat4,
    /// How the targets are cleared.
    pub clear_flags: ClearFlags,
    /// The color used by [`ClearFlags::Color`].
    pub background_color: LinearRgba,
    /// Whether the camera wants an HDR intermediate buffer.
    pub allow_hdr: bool,
    /// Per-camera overrides.
    pub settings: CameraSettings,
}

impl Camera {
    /// Creates a game camera with a perspective projection and default settings.
    pub fn new_perspective(
        id: CameraId,
        fov_y_radians: f32,
        pixel_size: Extent2D,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        Self {
            id,
            name: format!("Camera {}", id.0),
            kind: CameraKind::Game,
            projection: ProjectionType::Perspective { fov_y_radians },
            pixel_size,
            z_near,
            z_far,
            view_matrix: Mat4::IDENTITY,
            clear_flags: ClearFlags::Skybox,
            background_color: LinearRgba::BLACK,
            allow_hdr: true,
            settings: CameraSettings::default(),
        }
    }

    /// Creates a game camera with an orthographic projection and default settings.
    pub fn new_orthographic(
        id: CameraId,
        width: f32,
        height: f32,
        pixel_size: Extent2D,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        Self {
            projection: ProjectionType::Orthographic { width, height },
            ..Self::new_perspective(id, PI / 3.0, pixel_size, z_near, z_far)
        }
    }

    /// The aspect ratio of the pixel rectangle (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        if self.pixel_size.height > 0 {
            self.pixel_size.width as f32 / self.pixel_size.height as f32
        } else {
            1.0
        }
    }

    /// Calculates the projection matrix for this camera.
    ///
    /// This uses a right-handed coordinate system with a [0, 1] depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionType::Perspective { fov_y_radians } => Mat4::perspective_rh_zo(
                fov_y_radians,
                self.aspect_ratio(),
                self.z_near,
                self.z_far,
            ),
            ProjectionType::Orthographic { width, height } => {
                let half_width = width / 2.0;
                let half_height = height / 2.0;
                Mat4::orthographic_rh_zo(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.z_near,
                    self.z_far,
                )
            }
        }
    }

    /// Derives the parameters the visibility provider culls with.
    ///
    /// The shadow distance is the configured maximum clamped to the far plane.
    ///
    /// # Errors
    ///
    /// Returns a [`CullError`] when the camera is degenerate: an empty pixel
    /// rectangle, inverted or non-finite clip planes, a field of view outside
    /// `(0, PI)`, a non-positive orthographic extent or a non-finite view matrix.
    pub fn culling_parameters(
        &self,
        max_shadow_distance: f32,
    ) -> Result<CullingParameters, CullError> {
        if self.pixel_size.is_empty() {
            return Err(CullError::EmptyViewport);
        }
        let planes_valid = self.z_near.is_finite() && self.z_far.is_finite();
        let near_valid = match self.projection {
            ProjectionType::Perspective { .. } => self.z_near > 0.0,
            ProjectionType::Orthographic { .. } => true,
        };
        if !planes_valid || !near_valid || self.z_far <= self.z_near {
            return Err(CullError::InvalidClipPlanes {
                z_near: self.z_near,
                z_far: self.z_far,
            });
        }
        let projection_valid = match self.projection {
            ProjectionType::Perspective { fov_y_radians } => {
                fov_y_radians > 0.0 && fov_y_radians < PI
            }
            ProjectionType::Orthographic { width, height } => width > 0.0 && height > 0.0,
        };
        if !projection_valid {
            return Err(CullError::DegenerateProjection);
        }
        if !self.view_matrix.is_finite() {
            return Err(CullError::NonFiniteTransform);
        }

        let projection = self.projection_matrix();
        Ok(CullingParameters {
            view: self.view_matrix,
            projection,
            view_projection: projection * self.view_matrix,
            z_near: self.z_near,
            z_far: self.z_far,
            shadow_distance: max_shadow_distance.min(self.z_far),
            rendering_layer_mask: self.settings.rendering_layer_mask,
        })
    }
}

/// The inputs of a visibility query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullingParameters {
    /// The camera's view matrix.
    pub view: Mat4,
    /// The camera's unjittered projection matrix.
    pub projection: Mat4,
    /// `projection * view`.
    pub view_projection: Mat4,
    /// The near clip distance.
    pub z_near: f32,
    /// The far clip distance.
    pub z_far: f32,
    /// The distance up to which shadow casters are gathered.
    pub shadow_distance: f32,
    /// The rendering layers the camera draws.
    pub rendering_layer_mask: u32,
}
