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

//! The lanes of the Prism camera pipeline.
//!
//! Each lane records one well-delimited part of a camera's frame into a
//! [`CommandStream`](prism_core::renderer::CommandStream): light aggregation,
//! geometry drawing, motion vectors, temporal anti-aliasing and the shared lookup
//! tables. Lanes never submit; the orchestrator in `prism-agents` drives them in
//! order and owns the stream.

#![warn(missing_docs)]

pub mod light_lane;
pub mod persistent;
pub mod precompute_lane;
pub mod render_lane;
pub mod temporal_lane;

#[cfg(test)]
mod test_support;

pub use light_lane::{LightAggregator, LightingInputs, LtcAreaLightLut};
pub use persistent::PersistentTexture;
pub use precompute_lane::BrdfLut;
pub use render_lane::{lane_for, GeometryFrame, GeometryLane, RenderSurfaceSet, VelocityLane};
pub use temporal_lane::TemporalAccumulator;
