//! Model and normal transforms for figure instances
//!
//! The model matrix is `Translate * Rotate * Scale`: vertices are scaled first,
//! then rotated (X, then Y, then Z), then translated. Normals use the
//! inverse-transpose of the linear part so that non-uniform scale keeps them
//! perpendicular to their surfaces.

use super::math::{
    mat3_determinant, mat3_inverse, mat3_mul_vec, mat3_transpose, mat4_mul, mat4_rotation,
    mat4_scale, mat4_translation, mat4_transform_point, mat4_upper3, Mat3, Mat4, Vec3,
};

/// Error raised when an instance transform cannot be inverted
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    Singular { determinant: f32 },
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::Singular { determinant } => {
                write!(f, "singular model transform (determinant {})", determinant)
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Compose the model matrix from scale, euler rotation (degrees) and translation
pub fn model_matrix(scale: Vec3, rotation: Vec3, translate: Vec3) -> Mat4 {
    let s = mat4_scale(scale);
    let r = mat4_rotation(rotation);
    let t = mat4_translation(translate);
    mat4_mul(&t, &mat4_mul(&r, &s))
}

/// Inverse-transpose of the model matrix's linear part
pub fn normal_matrix(model: &Mat4) -> Result<Mat3, TransformError> {
    let linear = mat4_upper3(model);
    match mat3_inverse(&linear) {
        Some(inv) => Ok(mat3_transpose(&inv)),
        None => Err(TransformError::Singular { determinant: mat3_determinant(&linear) }),
    }
}

/// Precomputed transforms for one instance
#[derive(Debug, Clone)]
pub struct ModelTransform {
    pub matrix: Mat4,
    pub normal_matrix: Mat3,
}

impl ModelTransform {
    pub fn new(scale: Vec3, rotation: Vec3, translate: Vec3) -> Result<Self, TransformError> {
        let matrix = model_matrix(scale, rotation, translate);
        let normal_matrix = normal_matrix(&matrix)?;
        Ok(Self { matrix, normal_matrix })
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        mat4_transform_point(&self.matrix, p)
    }

    /// Transform and re-normalize a normal (zero normals stay zero)
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        mat3_mul_vec(&self.normal_matrix, n).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::mat4_identity;

    #[test]
    fn test_identity_instance() {
        let m = model_matrix(Vec3::ONE, Vec3::ZERO, Vec3::ZERO);
        let id = mat4_identity();
        for i in 0..4 {
            for j in 0..4 {
                assert!((m[i][j] - id[i][j]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let scale = Vec3::new(2.0, 3.0, 4.0);
        let rotation = Vec3::new(0.0, 0.0, 90.0);
        let translate = Vec3::new(10.0, 0.0, 5.0);
        let m = model_matrix(scale, rotation, translate);

        // Unit cube corner (1, 1, 1): scale -> (2, 3, 4), rotate 90 about Z -> (-3, 2, 4),
        // translate -> (7, 2, 9)
        let p = mat4_transform_point(&m, Vec3::new(1.0, 1.0, 1.0));
        assert!((p - Vec3::new(7.0, 2.0, 9.0)).len() < 1e-5, "{:?}", p);

        // Same result as applying the three matrices one after another
        let stepwise = mat4_transform_point(
            &mat4_translation(translate),
            mat4_transform_point(&mat4_rotation(rotation), mat4_transform_point(&mat4_scale(scale), Vec3::ONE)),
        );
        assert!((p - stepwise).len() < 1e-5);
    }

    #[test]
    fn test_normals_stay_perpendicular_under_non_uniform_scale() {
        let t = ModelTransform::new(Vec3::new(4.0, 1.0, 1.0), Vec3::ZERO, Vec3::ZERO).unwrap();
        // Surface x + y = 0 has normal (1, 1, 0) and tangent (1, -1, 0)
        let tangent = t.transform_point(Vec3::new(1.0, -1.0, 0.0));
        let normal = t.transform_normal(Vec3::new(1.0, 1.0, 0.0));
        assert!(normal.dot(tangent).abs() < 1e-5);
        assert!((normal.len() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_scale_is_singular() {
        let err = ModelTransform::new(Vec3::new(1.0, 0.0, 1.0), Vec3::ZERO, Vec3::ZERO).unwrap_err();
        assert!(matches!(err, TransformError::Singular { .. }));
    }
}
