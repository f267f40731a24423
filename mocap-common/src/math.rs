//! Rotation algebra for pose conversion
//!
//! Conversions between unit quaternions, 4×4 homogeneous rotation matrices and
//! Euler angles. Everything here is pure and total: inputs are unit quaternions
//! or proper rotation matrices, and degenerate matrices are resolved by branch
//! selection instead of errors.
//!
//! Matrices are `glam::DMat4` (column storage, column vectors). Element access
//! in this module uses the math convention `(row, col)` via [`element`].
//!
//! # Euler convention
//!
//! Angles are `(X, Y, Z)` = roll/pitch/yaw in radians, for the rotation
//! `Rz(Z) · Ry(Y) · Rx(X)`. Near pitch = ±90° (gimbal lock) the split between
//! roll and yaw is not unique; the asin argument is clamped and no further
//! correction is applied, so precision degrades there.

use glam::{DMat4, DQuat, DVec3, DVec4};

/// Read `m[row][col]` in math convention
#[inline]
pub fn element(m: &DMat4, row: usize, col: usize) -> f64 {
    m.col(col)[row]
}

/// Homogeneous translation matrix
#[inline]
pub fn translation_matrix(position: DVec3) -> DMat4 {
    DMat4::from_translation(position)
}

/// Convert a unit quaternion to Euler angles `(X, Y, Z)` in radians
pub fn quat_to_euler(q: DQuat) -> DVec3 {
    let (w, x, y, z) = (q.w, q.x, q.y, q.z);
    let y2 = y * y;

    let t0 = 2.0 * (w * x + y * z);
    let t1 = 1.0 - 2.0 * (x * x + y2);
    let roll = t0.atan2(t1);

    // Clamped: floating-point overshoot near the poles would make asin NaN
    let t2 = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
    let pitch = t2.asin();

    let t3 = 2.0 * (w * z + x * y);
    let t4 = 1.0 - 2.0 * (y2 + z * z);
    let yaw = t3.atan2(t4);

    DVec3::new(roll, pitch, yaw)
}

/// Convert Euler angles `(X, Y, Z)` in radians to a unit quaternion
///
/// Inverse of [`quat_to_euler`] away from gimbal lock.
pub fn euler_to_quat(euler: DVec3) -> DQuat {
    let (sr, cr) = (euler.x * 0.5).sin_cos();
    let (sp, cp) = (euler.y * 0.5).sin_cos();
    let (sy, cy) = (euler.z * 0.5).sin_cos();

    DQuat::from_xyzw(
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
}

/// Convert a unit quaternion to a homogeneous rotation matrix
///
/// Translation column is zero and the bottom row is `[0, 0, 0, 1]`.
pub fn quat_to_matrix(q: DQuat) -> DMat4 {
    let (w, x, y, z) = (q.w, q.x, q.y, q.z);

    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    // Rows of the rotation block
    let r0 = [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)];
    let r1 = [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)];
    let r2 = [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)];

    DMat4::from_cols(
        DVec4::new(r0[0], r1[0], r2[0], 0.0),
        DVec4::new(r0[1], r1[1], r2[1], 0.0),
        DVec4::new(r0[2], r1[2], r2[2], 0.0),
        DVec4::W,
    )
}

/// Extract a unit quaternion from the rotation block of `m` (Shepperd's method)
///
/// Only the upper-left 3×3 block is read. Branches, in order:
/// 1. trace > 0
/// 2. `m00` is the largest diagonal entry
/// 3. `m11` is larger than `m22`
/// 4. otherwise `m22`
///
/// Each branch divides by a factor derived from the dominant term, so `S`
/// never approaches zero for a proper rotation.
pub fn matrix_to_quat(m: &DMat4) -> DQuat {
    let m00 = element(m, 0, 0);
    let m01 = element(m, 0, 1);
    let m02 = element(m, 0, 2);
    let m10 = element(m, 1, 0);
    let m11 = element(m, 1, 1);
    let m12 = element(m, 1, 2);
    let m20 = element(m, 2, 0);
    let m21 = element(m, 2, 1);
    let m22 = element(m, 2, 2);

    let trace = m00 + m11 + m22;

    if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        DQuat::from_xyzw((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s)
    } else if m00 > m11 && m00 > m22 {
        let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
        DQuat::from_xyzw(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
    } else if m11 > m22 {
        let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
        DQuat::from_xyzw((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
    } else {
        let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
        DQuat::from_xyzw((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
    }
}

/// Translation column of a homogeneous transform
#[inline]
pub fn translation_of(m: &DMat4) -> DVec3 {
    m.w_axis.truncate()
}

/// Rigid inverse of `translation(p) · rotation(q)`: `rotationᵀ · translation(-p)`
pub fn rigid_inverse(position: DVec3, rotation: DQuat) -> DMat4 {
    quat_to_matrix(rotation).transpose() * translation_matrix(-position)
}
