//! Math utilities and types
//!
//! Thin aliases over `nalgebra` so the rest of the engine speaks in
//! single-precision vectors.

pub use nalgebra::{Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (used for RGBA colours)
pub type Vec4 = Vector4<f32>;

/// Tolerance below which a length is treated as zero
pub const EPSILON: f32 = 1.0e-6;

/// Math utility functions
pub mod utils {
    use super::{Vec3, EPSILON};

    /// Normalize `v`, or return `fallback` when `v` is too short to have a direction
    pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
        v.try_normalize(EPSILON).unwrap_or(fallback)
    }

    /// Component-wise clamp of `point` into the box `[min, max]`
    pub fn clamp_vec(point: Vec3, min: Vec3, max: Vec3) -> Vec3 {
        point.sup(&min).inf(&max)
    }

    /// Smallest power of two that is greater than or equal to `value` (at least 1)
    pub fn next_power_of_two(value: f32) -> f32 {
        if !value.is_finite() {
            return value;
        }
        let mut size = 1.0;
        while size < value {
            size *= 2.0;
        }
        size
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp_vec() {
        let clamped = clamp_vec(
            Vec3::new(-5.0, 0.5, 9.0),
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );
        assert_relative_eq!(clamped, Vec3::new(-1.0, 0.5, 1.0));
    }

    #[test]
    fn test_normalize_or_fallback() {
        assert_relative_eq!(normalize_or(Vec3::zeros(), Vec3::y()), Vec3::y());
        assert_relative_eq!(normalize_or(Vec3::new(3.0, 0.0, 0.0), Vec3::y()), Vec3::x());
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0.2), 1.0);
        assert_eq!(next_power_of_two(4.0), 4.0);
        assert_eq!(next_power_of_two(4.1), 8.0);
        assert_eq!(next_power_of_two(33.0), 64.0);
    }
}
