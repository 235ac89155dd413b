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

//! Acts as the **[A]gent** for the camera pipeline.
//!
//! The agent decides, per camera, which lanes run and in what order: lighting
//! before geometry, geometry before the temporal resolve, the resolve before the
//! final composite. It owns the long-lived resources the lanes share and submits
//! one command stream per camera.

mod frame;
mod orchestrator;

pub use frame::*;
pub use orchestrator::*;
