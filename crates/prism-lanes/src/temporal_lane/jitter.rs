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

//! Sub-pixel jitter for temporal accumulation.

use prism_core::math::{Extent2D, Mat4, Vec2, Vec3};

/// The length of the jitter cycle.
pub const JITTER_SAMPLE_COUNT: u32 = 8;

/// Returns element `index` of the Halton sequence in `base`, in `[0, 1)`.
pub fn halton(mut index: u32, base: u32) -> f32 {
    let mut fraction = 1.0;
    let mut result = 0.0;
    let inv_base = 1.0 / base as f32;
    while index > 0 {
        fraction *= inv_base;
        result += fraction * (index % base) as f32;
        index /= base;
    }
    result
}

/// A centered Halton(2, 3) sample cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JitterSequence {
    index: u32,
}

impl JitterSequence {
    /// Starts a sequence at its first sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// The index of the sample [`JitterSequence::next_offset`] returns next.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the next sample, in pixels, within `[-0.5, 0.5)` on both axes.
    pub fn next_offset(&mut self) -> Vec2 {
        // Halton element 0 is the origin on both axes, so the cycle starts at 1.
        let n = self.index + 1;
        self.index = (self.index + 1) % JITTER_SAMPLE_COUNT;
        Vec2::new(halton(n, 2) - 0.5, halton(n, 3) - 0.5)
    }
}

/// Offsets `projection` so the rendered image moves by `jitter_pixels` on a
/// `buffer_size` pixel grid.
///
/// The offset is applied in clip space. For a perspective projection this shifts
/// the z column; for an orthographic one it moves the frustum bounds.
pub fn jittered_projection(projection: Mat4, jitter_pixels: Vec2, buffer_size: Extent2D) -> Mat4 {
    let width = buffer_size.width.max(1) as f32;
    let height = buffer_size.height.max(1) as f32;
    let ndc_offset = Vec3::new(
        2.0 * jitter_pixels.x / width,
        2.0 * jitter_pixels.y / height,
        0.0,
    );
    Mat4::from_translation(ndc_offset) * projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use prism_core::math::Vec4;

    #[test]
    fn test_halton_first_elements() {
        assert_eq!(halton(1, 2), 0.5);
        assert_eq!(halton(2, 2), 0.25);
        assert_eq!(halton(3, 2), 0.75);
        assert_relative_eq!(halton(1, 3), 1.0 / 3.0);
        assert_relative_eq!(halton(2, 3), 2.0 / 3.0);
        assert_relative_eq!(halton(3, 3), 1.0 / 9.0);
    }

    #[test]
    fn test_consecutive_samples_differ_and_stay_within_half_a_pixel() {
        let mut sequence = JitterSequence::new();
        let mut previous = sequence.next_offset();
        for _ in 0..(JITTER_SAMPLE_COUNT * 3) {
            let sample = sequence.next_offset();
            assert_ne!(sample, previous);
            assert!(sample.x.abs() <= 0.5 && sample.y.abs() <= 0.5);
            previous = sample;
        }
    }

    #[test]
    fn test_sequence_cycles() {
        let mut sequence = JitterSequence::new();
        let first = sequence.next_offset();
        for _ in 1..JITTER_SAMPLE_COUNT {
            sequence.next_offset();
        }
        assert_eq!(sequence.index(), 0);
        assert_eq!(sequence.next_offset(), first);
    }

    #[test]
    fn test_perspective_jitter_shifts_ndc_by_two_texels_per_pixel() {
        let projection = Mat4::perspective_rh_zo(1.0, 2.0, 0.1, 100.0);
        let size = Extent2D::new(200, 100);
        let jitter = Vec2::new(0.25, -0.5);
        let jittered = jittered_projection(projection, jitter, size);

        // Only the z column moves.
        assert_eq!(jittered.cols[0], projection.cols[0]);
        assert_eq!(jittered.cols[3], projection.cols[3]);
        assert_relative_eq!(jittered.cols[2].x, projection.cols[2].x - 2.0 * 0.25 / 200.0);

        let point = Vec4::new(1.0, 2.0, -10.0, 1.0);
        let a = projection * point;
        let b = jittered * point;
        assert_relative_eq!(b.x / b.w - a.x / a.w, 2.0 * 0.25 / 200.0, epsilon = 1e-6);
        assert_relative_eq!(b.y / b.w - a.y / a.w, 2.0 * -0.5 / 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_orthographic_jitter_moves_the_bounds() {
        let projection = Mat4::orthographic_rh_zo(-4.0, 4.0, -2.0, 2.0, 0.0, 10.0);
        let size = Extent2D::new(80, 40);
        let jitter = Vec2::new(0.5, 0.5);
        let jittered = jittered_projection(projection, jitter, size);

        assert_eq!(jittered.cols[2], projection.cols[2]);
        // Half a pixel on an 8-unit wide, 80-pixel frustum is 0.05 world units.
        let shifted = jittered * Vec4::new(4.0 - 0.05, 2.0 - 0.05, 0.0, 1.0);
        assert_relative_eq!(shifted.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(shifted.y, 1.0, epsilon = 1e-5);
    }
}
