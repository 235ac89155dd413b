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

//! Defines the hierarchy of error types for the camera pipeline.

use crate::renderer::api::TextureId;
use std::fmt;

/// An error raised while deriving culling parameters or culling a camera's view.
///
/// This is the one recoverable condition of the pipeline: the frame orchestrator
/// logs it and aborts only the affected camera.
#[derive(Debug, Clone, PartialEq)]
pub enum CullError {
    /// The camera's pixel rectangle has a zero dimension.
    EmptyViewport,
    /// The near/far clip planes do not describe a valid depth range.
    InvalidClipPlanes {
        /// The near clip distance.
        z_near: f32,
        /// The far clip distance.
        z_far: f32,
    },
    /// The projection parameters (field of view or orthographic extents) are degenerate.
    DegenerateProjection,
    /// The camera's view matrix contains non-finite values.
    NonFiniteTransform,
    /// The visibility provider rejected the request.
    ProviderFailed(String),
}

impl fmt::Display for CullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CullError::EmptyViewport => write!(f, "Camera viewport has a zero dimension."),
            CullError::InvalidClipPlanes { z_near, z_far } => {
                write!(f, "Invalid clip planes: near={z_near}, far={z_far}")
            }
            CullError::DegenerateProjection => {
                write!(f, "Camera projection parameters are degenerate.")
            }
            CullError::NonFiniteTransform => {
                write!(f, "Camera view matrix contains non-finite values.")
            }
            CullError::ProviderFailed(msg) => write!(f, "Visibility provider failed: {msg}"),
        }
    }
}

impl std::error::Error for CullError {}

/// An error related to the management of GPU resources.
#[derive(Debug)]
pub enum ResourceError {
    /// The texture handle does not refer to a live resource.
    NotFound(TextureId),
    /// The descriptor could not be honoured by the device.
    InvalidDescriptor(String),
    /// The uploaded data does not match the texture's expected byte size.
    SizeMismatch {
        /// The number of bytes the texture region expects.
        expected: usize,
        /// The number of bytes that were supplied.
        actual: usize,
    },
    /// A backend-specific error occurred.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound(id) => write!(f, "Resource not found with ID: {id:?}"),
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
            ResourceError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Texture upload size mismatch: expected {expected} bytes, got {actual}"
                )
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error that can occur while rendering a frame.
#[derive(Debug)]
pub enum RenderError {
    /// A long-lived resource (history surface, lookup table) could not be created or filled.
    ResourceError(ResourceError),
    /// An internal or unexpected error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

/// An error raised while loading or saving pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The settings text is not valid RON for the expected structure.
    Parse(ron::error::SpannedError),
    /// The settings could not be serialized.
    Serialize(ron::Error),
    /// The settings parsed but hold values outside their allowed range.
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Parse(err) => write!(f, "Failed to parse pipeline settings: {err}"),
            SettingsError::Serialize(err) => {
                write!(f, "Failed to serialize pipeline settings: {err}")
            }
            SettingsError::Invalid(msg) => write!(f, "Invalid pipeline settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Parse(err) => Some(err),
            SettingsError::Serialize(err) => Some(err),
            SettingsError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn cull_error_display() {
        let err = CullError::InvalidClipPlanes {
            z_near: 5.0,
            z_far: 1.0,
        };
        assert_eq!(format!("{err}"), "Invalid clip planes: near=5, far=1");
    }

    #[test]
    fn render_error_display_wrapping_resource_error() {
        let res_err = ResourceError::NotFound(TextureId(7));
        let render_err: RenderError = res_err.into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Resource not found with ID: TextureId(7)"
        );
        assert!(render_err.source().is_some());
    }

    #[test]
    fn resource_error_size_mismatch_display() {
        let err = ResourceError::SizeMismatch {
            expected: 16,
            actual: 4,
        };
        assert_eq!(
            format!("{err}"),
            "Texture upload size mismatch: expected 16 bytes, got 4"
        );
    }
}
