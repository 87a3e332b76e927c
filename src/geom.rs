use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Rigid 3D transform: translation plus unit-quaternion rotation.
///
/// Composition is right-multiplication: `a.compose(&b)` applies `b` inside
/// `a`'s frame. `UnitQuaternion` keeps the rotation normalized; feeding a
/// non-unit quaternion through `from_quat_xyzw` renormalizes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn identity() -> Pose {
        Pose {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Pose {
        Pose { translation, rotation }
    }

    /// Build from `[x, y, z]` meters and an `[x, y, z, w]` quaternion.
    pub fn from_quat_xyzw(translation: [f64; 3], quat: [f64; 4]) -> Pose {
        Pose {
            translation: Vector3::new(translation[0], translation[1], translation[2]),
            rotation: UnitQuaternion::from_quaternion(Quaternion::new(
                quat[3], quat[0], quat[1], quat[2],
            )),
        }
    }

    /// Apply `other` within this pose's frame.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            translation: self.translation + self.rotation * other.translation,
            rotation: self.rotation * other.rotation,
        }
    }

    /// The transform that undoes this one: `a.compose(&a.inverse())` is identity.
    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            translation: -(rotation * self.translation),
            rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Pose {
        Pose::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Pose, b: &Pose) -> bool {
        (a.translation - b.translation).norm() < 1e-10 && a.rotation.angle_to(&b.rotation) < 1e-10
    }

    #[test]
    fn test_compose_with_identity() {
        let p = Pose::from_quat_xyzw([0.1, -0.2, 0.3], [0.5, 0.5, 0.5, 0.5]);
        assert!(close(&p.compose(&Pose::identity()), &p));
        assert!(close(&Pose::identity().compose(&p), &p));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let p = Pose::from_quat_xyzw([1.0, 2.0, -0.5], [0.0, 0.7071067811865476, 0.0, 0.7071067811865476]);
        assert!(close(&p.compose(&p.inverse()), &Pose::identity()));
        assert!(close(&p.inverse().compose(&p), &Pose::identity()));
    }

    #[test]
    fn test_compose_is_associative() {
        let a = Pose::from_quat_xyzw([0.3, 0.0, 0.1], [0.5, 0.5, 0.5, 0.5]);
        let b = Pose::from_quat_xyzw([-0.2, 0.4, 0.0], [-0.5, -0.5, 0.5, 0.5]);
        let c = Pose::from_quat_xyzw([0.0, 0.1, 0.9], [0.0, 0.0, 0.0, 1.0]);
        assert!(close(&a.compose(&b).compose(&c), &a.compose(&b.compose(&c))));
    }

    #[test]
    fn test_from_quat_renormalizes() {
        let p = Pose::from_quat_xyzw([0.0; 3], [0.0, 0.0, 0.0, 2.0]);
        assert!((p.rotation.norm() - 1.0).abs() < 1e-12);
    }
}
