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

//! Immediate-mode meshes recorded directly into the command stream.

use crate::math::{Vec2, Vec3};

/// A small CPU-side triangle mesh drawn without a persistent vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmediateMesh {
    /// Vertex positions in local space.
    pub positions: Vec<Vec3>,
    /// Vertex normals in local space.
    pub normals: Vec<Vec3>,
    /// Texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl ImmediateMesh {
    /// Builds a quad in the local XY plane spanning `±half_extents`, facing -Z.
    pub fn quad(half_extents: Vec2) -> Self {
        let (w, h) = (half_extents.x, half_extents.y);
        Self {
            positions: vec![
                Vec3::new(-w, -h, 0.0),
                Vec3::new(w, -h, 0.0),
                Vec3::new(-w, h, 0.0),
                Vec3::new(w, h, 0.0),
            ],
            normals: vec![-Vec3::Z; 4],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
            ],
            indices: vec![0, 2, 1, 2, 3, 1],
        }
    }

    /// The number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
