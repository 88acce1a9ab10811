/// Model rotation for turning the ship in front of a fixed camera
use nalgebra::{Matrix4, Point3, Vector3};

/// Maximum pitch either way, keeps the deck from flipping over (radians)
const PITCH_LIMIT: f32 = 1.4;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians); pitch is clamped
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x = (self.x + dx).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.y += dy;
        self.z += dz;
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    /// Rotation about `pivot` instead of the origin
    pub fn rotation_about(rotation: &RotationState, pivot: &Point3<f32>) -> Matrix4<f32> {
        let to_pivot = Matrix4::new_translation(&pivot.coords);
        let from_pivot = Matrix4::new_translation(&-pivot.coords);
        to_pivot * Self::rotation_matrix(rotation) * from_pivot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);

        state.rotate(10.0, 0.0, 0.0);
        assert_eq!(state.x, PITCH_LIMIT);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_pivot_is_fixed_point() {
        let pivot = Point3::new(3.0, 12.0, -1.0);
        let matrix = Transform::rotation_about(&RotationState::new(0.4, 1.1, 0.0), &pivot);
        let moved = matrix.transform_point(&pivot);
        assert!((moved - pivot).norm() < 1e-4);
    }
}
