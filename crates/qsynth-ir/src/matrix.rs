//! 2x2 unitary algebra.
//!
//! Gate matrices for the single-target gates of the IR, products, and the
//! ZYZ Euler decomposition used to turn an arbitrary single-qubit unitary
//! into U3 parameters plus a global phase.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A 2x2 complex matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

/// Euler angles of `U = e^{i·phase} · Rz(alpha) · Ry(beta) · Rz(gamma)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZyzAngles {
    /// Outer Z rotation (applied last).
    pub alpha: f64,
    /// Y rotation.
    pub beta: f64,
    /// Inner Z rotation (applied first).
    pub gamma: f64,
    /// Global phase.
    pub phase: f64,
}

impl Unitary2x2 {
    /// Create a matrix from its four entries.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// The identity.
    pub fn identity() -> Self {
        Self::new(ONE, ZERO, ZERO, ONE)
    }

    /// Pauli-X.
    pub fn x() -> Self {
        Self::new(ZERO, ONE, ONE, ZERO)
    }

    /// `Rx(θ) = exp(-iθX/2)`.
    pub fn rx(theta: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(0.0, -s),
            Complex64::new(0.0, -s),
            Complex64::new(c, 0.0),
        )
    }

    /// `Ry(θ) = exp(-iθY/2)`.
    pub fn ry(theta: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(-s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(c, 0.0),
        )
    }

    /// `Rz(θ) = exp(-iθZ/2)`.
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            ZERO,
            ZERO,
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// Phase gate `P(λ) = diag(1, e^{iλ})`.
    pub fn p(lambda: f64) -> Self {
        Self::new(ONE, ZERO, ZERO, Complex64::from_polar(1.0, lambda))
    }

    /// `U3(θ, φ, λ) = e^{i(φ+λ)/2} · Rz(φ) · Ry(θ) · Rz(λ)`.
    pub fn u3(theta: f64, phi: f64, lambda: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::new(
            Complex64::new(c, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        )
    }

    /// Scalar multiple `e^{iθ} · I`.
    pub fn global_phase(theta: f64) -> Self {
        let e = Complex64::from_polar(1.0, theta);
        Self::new(e, ZERO, ZERO, e)
    }

    /// Matrix product `self · other` (apply `other` first).
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        let [a, b, c, d] = self.data;
        Self::new(a.conj(), c.conj(), b.conj(), d.conj())
    }

    /// Determinant.
    pub fn det(&self) -> Complex64 {
        let [a, b, c, d] = self.data;
        a * d - b * c
    }

    /// Check that `U·U† = I` within `tol`.
    pub fn is_unitary(&self, tol: f64) -> bool {
        self.mul(&self.dagger()).approx_eq(&Self::identity(), tol)
    }

    /// Entry-wise comparison within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(x, y)| (x - y).norm() < tol)
    }

    /// Comparison up to a global phase factor.
    pub fn approx_eq_up_to_phase(&self, other: &Self, tol: f64) -> bool {
        // Align phases on the largest entry of `other`.
        let Some((idx, _)) = other
            .data
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.norm().total_cmp(&y.norm()))
        else {
            return false;
        };
        if self.data[idx].norm() < EPSILON {
            return false;
        }
        let ratio = other.data[idx] / self.data[idx];
        let aligned = self.data.map(|x| x * ratio);
        aligned
            .iter()
            .zip(other.data.iter())
            .all(|(x, y)| (x - y).norm() < tol)
    }

    /// ZYZ Euler decomposition.
    ///
    /// Returns angles with `self = e^{i·phase} · Rz(alpha) · Ry(beta) · Rz(gamma)`.
    pub fn zyz_decomposition(&self) -> ZyzAngles {
        let phase = self.det().arg() / 2.0;
        let unphase = Complex64::from_polar(1.0, -phase);
        let [v00, _, v10, v11] = self.data.map(|x| x * unphase);

        // v00 = cos(β/2)·e^{-i(α+γ)/2}, v10 = sin(β/2)·e^{i(α-γ)/2}
        let beta = 2.0 * v10.norm().atan2(v00.norm());
        let sum = if v00.norm() > EPSILON {
            2.0 * v11.arg()
        } else {
            0.0
        };
        let diff = if v10.norm() > EPSILON {
            2.0 * v10.arg()
        } else {
            0.0
        };

        ZyzAngles {
            alpha: f64::midpoint(sum, diff),
            beta,
            gamma: (sum - diff) / 2.0,
            phase,
        }
    }

    /// U3 parameters and residual global phase.
    ///
    /// Returns `(θ, φ, λ, phase)` with `self = e^{i·phase} · U3(θ, φ, λ)`.
    pub fn to_u3(&self) -> (f64, f64, f64, f64) {
        let zyz = self.zyz_decomposition();
        let residual = zyz.phase - (zyz.alpha + zyz.gamma) / 2.0;
        (
            zyz.beta,
            zyz.alpha,
            zyz.gamma,
            normalize_angle(residual),
        )
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}
