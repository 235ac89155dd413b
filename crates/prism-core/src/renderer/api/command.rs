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

//! The ordered command stream recorded for one camera.
//!
//! Every pipeline step appends to a single [`CommandStream`]; the device executes
//! the commands in exactly the recorded order once the stream is submitted. There
//! is no other synchronization primitive.

use super::draw::DrawRenderers;
use super::scene::ImmediateMesh;
use super::shader::{FullscreenProgram, MaterialInstance, ShaderKeyword, ShaderProperty};
use super::target::{BlendMode, LoadOp, RenderTarget, RenderTargetBinding, Viewport};
use super::texture::{SurfaceId, TextureDescriptor};
use crate::math::{LinearRgba, Mat4, Vec4};
use std::borrow::Cow;
use std::collections::HashSet;

/// A full-screen triangle draw.
#[derive(Debug, Clone, PartialEq)]
pub struct FullscreenDraw {
    /// The program drawn.
    pub program: FullscreenProgram,
    /// The texture bound as the program's source, if it reads one.
    pub source: Option<RenderTarget>,
    /// The color target drawn into.
    pub destination: RenderTarget,
    /// The load operation applied to `destination`.
    pub load: LoadOp,
    /// The blend applied while drawing.
    pub blend: BlendMode,
}

/// A single recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Opens a named profiling scope.
    BeginSample(Cow<'static, str>),
    /// Closes the innermost profiling scope with this name.
    EndSample(Cow<'static, str>),
    /// Acquires a temporary surface.
    AcquireTemporary {
        /// The handle later commands use.
        surface: SurfaceId,
        /// What to allocate.
        descriptor: TextureDescriptor,
    },
    /// Releases a temporary surface acquired in this stream.
    ReleaseTemporary(SurfaceId),
    /// Binds render targets.
    SetRenderTargets(RenderTargetBinding),
    /// Clears the bound render targets.
    ClearRenderTarget {
        /// Clears depth to the far plane.
        clear_depth: bool,
        /// Clears color to `color`.
        clear_color: bool,
        /// The clear color.
        color: LinearRgba,
    },
    /// Restricts rasterization to a pixel rectangle.
    SetViewport(Viewport),
    /// Copies one texture into another of the same size and format.
    CopyTexture {
        /// The texture read.
        source: RenderTarget,
        /// The texture written.
        destination: RenderTarget,
    },
    /// Draws a full-screen triangle.
    DrawFullscreen(FullscreenDraw),
    /// Draws visible renderers.
    DrawRenderers(DrawRenderers),
    /// Draws the skybox behind the existing depth.
    DrawSkybox,
    /// Draws an immediate mesh.
    DrawMesh {
        /// The mesh.
        mesh: ImmediateMesh,
        /// The local-to-world transform.
        transform: Mat4,
        /// The per-draw material instance.
        material: MaterialInstance,
    },
    /// Overrides the view and projection matrices of subsequent draws.
    SetViewProjection {
        /// The view matrix.
        view: Mat4,
        /// The projection matrix.
        projection: Mat4,
    },
    /// Binds a texture globally.
    SetGlobalTexture {
        /// The property name.
        property: ShaderProperty,
        /// The bound texture.
        texture: RenderTarget,
    },
    /// Sets a global vector.
    SetGlobalVector {
        /// The property name.
        property: ShaderProperty,
        /// The value.
        value: Vec4,
    },
    /// Sets a global vector array.
    SetGlobalVectorArray {
        /// The property name.
        property: ShaderProperty,
        /// The values.
        values: Vec<Vec4>,
    },
    /// Sets a global matrix.
    SetGlobalMatrix {
        /// The property name.
        property: ShaderProperty,
        /// The value.
        value: Mat4,
    },
    /// Sets a global integer.
    SetGlobalInt {
        /// The property name.
        property: ShaderProperty,
        /// The value.
        value: i32,
    },
    /// Enables or disables a global keyword.
    SetKeyword {
        /// The keyword.
        keyword: ShaderKeyword,
        /// Whether it is enabled.
        enabled: bool,
    },
}

/// An ordered list of commands for one camera, submitted once.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommandStream {
    commands: Vec<Command>,
    next_surface: u32,
}

impl CommandStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Records the acquisition of a temporary surface and returns its handle.
    pub fn acquire_temporary(&mut self, descriptor: TextureDescriptor) -> SurfaceId {
        let surface = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.commands.push(Command::AcquireTemporary {
            surface,
            descriptor,
        });
        surface
    }

    /// Records the release of a temporary surface.
    pub fn release_temporary(&mut self, surface: SurfaceId) {
        self.commands.push(Command::ReleaseTemporary(surface));
    }

    /// Opens a profiling scope.
    pub fn begin_sample(&mut self, name: impl Into<Cow<'static, str>>) {
        self.commands.push(Command::BeginSample(name.into()));
    }

    /// Closes a profiling scope.
    pub fn end_sample(&mut self, name: impl Into<Cow<'static, str>>) {
        self.commands.push(Command::EndSample(name.into()));
    }

    /// Binds a texture globally.
    pub fn set_global_texture(&mut self, property: ShaderProperty, texture: RenderTarget) {
        self.commands
            .push(Command::SetGlobalTexture { property, texture });
    }

    /// Sets a global vector.
    pub fn set_global_vector(&mut self, property: ShaderProperty, value: Vec4) {
        self.commands
            .push(Command::SetGlobalVector { property, value });
    }

    /// Sets a global vector array.
    pub fn set_global_vector_array(&mut self, property: ShaderProperty, values: &[Vec4]) {
        self.commands.push(Command::SetGlobalVectorArray {
            property,
            values: values.to_vec(),
        });
    }

    /// Sets a global matrix.
    pub fn set_global_matrix(&mut self, property: ShaderProperty, value: Mat4) {
        self.commands
            .push(Command::SetGlobalMatrix { property, value });
    }

    /// Sets a global integer.
    pub fn set_global_int(&mut self, property: ShaderProperty, value: i32) {
        self.commands.push(Command::SetGlobalInt { property, value });
    }

    /// Enables or disables a keyword.
    pub fn set_keyword(&mut self, keyword: ShaderKeyword, enabled: bool) {
        self.commands.push(Command::SetKeyword { keyword, enabled });
    }

    /// The recorded commands, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the temporaries acquired but not released, in acquisition order.
    pub fn live_temporaries(&self) -> Vec<SurfaceId> {
        let released: HashSet<SurfaceId> = self
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::ReleaseTemporary(id) => Some(*id),
                _ => None,
            })
            .collect();
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::AcquireTemporary { surface, .. } if !released.contains(surface) => {
                    Some(*surface)
                }
                _ => None,
            })
            .collect()
    }
}
