//! Gate matrices.
//!
//! Two-qubit matrices act on the local index `b0 + 2 * b1`, where `b0` is
//! the bit of the first listed qubit (the control, for controlled gates).

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use qecsim_ir::StandardGate;

/// A 2×2 complex matrix, row-major.
pub type Matrix2 = [[Complex64; 2]; 2];

/// A 4×4 complex matrix, row-major.
pub type Matrix4 = [[Complex64; 4]; 4];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Matrix of a standard gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateMatrix {
    /// Single-qubit unitary.
    Single(Matrix2),
    /// Two-qubit unitary.
    Two(Matrix4),
}

/// Look up the unitary of a standard gate.
pub fn gate_matrix(gate: &StandardGate) -> GateMatrix {
    match gate {
        StandardGate::I => GateMatrix::Single(identity2()),
        StandardGate::X => GateMatrix::Single(pauli_x()),
        StandardGate::Y => GateMatrix::Single(pauli_y()),
        StandardGate::Z => GateMatrix::Single(pauli_z()),
        StandardGate::H => {
            let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
            GateMatrix::Single([[h, h], [h, -h]])
        }
        StandardGate::S => GateMatrix::Single([[ONE, ZERO], [ZERO, I]]),
        StandardGate::Sdg => GateMatrix::Single([[ONE, ZERO], [ZERO, -I]]),
        StandardGate::SX => {
            let a = Complex64::new(0.5, 0.5);
            let b = Complex64::new(0.5, -0.5);
            GateMatrix::Single([[a, b], [b, a]])
        }
        StandardGate::SXdg => {
            let a = Complex64::new(0.5, -0.5);
            let b = Complex64::new(0.5, 0.5);
            GateMatrix::Single([[a, b], [b, a]])
        }
        StandardGate::Rx(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, -(theta / 2.0).sin());
            GateMatrix::Single([[c, s], [s, c]])
        }
        StandardGate::Ry(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new((theta / 2.0).sin(), 0.0);
            GateMatrix::Single([[c, -s], [s, c]])
        }
        StandardGate::Rz(theta) => GateMatrix::Single([
            [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
            [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
        ]),
        StandardGate::U(theta, phi, lambda) => {
            let c = (theta / 2.0).cos();
            let s = (theta / 2.0).sin();
            GateMatrix::Single([
                [
                    Complex64::new(c, 0.0),
                    -Complex64::from_polar(s, *lambda),
                ],
                [
                    Complex64::from_polar(s, *phi),
                    Complex64::from_polar(c, phi + lambda),
                ],
            ])
        }
        StandardGate::CX => GateMatrix::Two(permutation4(&[(0, 0), (1, 3), (2, 2), (3, 1)], ONE)),
        StandardGate::CY => {
            let mut m = [[ZERO; 4]; 4];
            m[0][0] = ONE;
            m[2][2] = ONE;
            m[3][1] = I;
            m[1][3] = -I;
            GateMatrix::Two(m)
        }
        StandardGate::CZ => {
            let mut m = permutation4(&[(0, 0), (1, 1), (2, 2), (3, 3)], ONE);
            m[3][3] = -ONE;
            GateMatrix::Two(m)
        }
        StandardGate::Swap => {
            GateMatrix::Two(permutation4(&[(0, 0), (1, 2), (2, 1), (3, 3)], ONE))
        }
        StandardGate::ISwap => {
            let mut m = [[ZERO; 4]; 4];
            m[0][0] = ONE;
            m[3][3] = ONE;
            m[1][2] = I;
            m[2][1] = I;
            GateMatrix::Two(m)
        }
    }
}

fn permutation4(pairs: &[(usize, usize)], value: Complex64) -> Matrix4 {
    let mut m = [[ZERO; 4]; 4];
    for &(row, col) in pairs {
        m[row][col] = value;
    }
    m
}

/// The 2×2 identity.
pub fn identity2() -> Matrix2 {
    [[ONE, ZERO], [ZERO, ONE]]
}

/// Pauli X.
pub fn pauli_x() -> Matrix2 {
    [[ZERO, ONE], [ONE, ZERO]]
}

/// Pauli Y.
pub fn pauli_y() -> Matrix2 {
    [[ZERO, -I], [I, ZERO]]
}

/// Pauli Z.
pub fn pauli_z() -> Matrix2 {
    [[ONE, ZERO], [ZERO, -ONE]]
}

/// Conjugate transpose of a 2×2 matrix.
pub fn dagger2(m: &Matrix2) -> Matrix2 {
    [
        [m[0][0].conj(), m[1][0].conj()],
        [m[0][1].conj(), m[1][1].conj()],
    ]
}

/// Product `a · b` of 2×2 matrices.
pub fn mul2(a: &Matrix2, b: &Matrix2) -> Matrix2 {
    let mut out = [[ZERO; 2]; 2];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, entry) in row.iter_mut().enumerate() {
            *entry = a[r][0] * b[0][c] + a[r][1] * b[1][c];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn is_unitary2(m: &Matrix2) -> bool {
        let p = mul2(m, &dagger2(m));
        let id = identity2();
        (0..2).all(|r| (0..2).all(|c| (p[r][c] - id[r][c]).norm() < 1e-12))
    }

    fn is_unitary4(m: &Matrix4) -> bool {
        (0..4).all(|r| {
            (0..4).all(|c| {
                let dot: Complex64 = (0..4).map(|k| m[r][k] * m[c][k].conj()).sum();
                let expected = if r == c { ONE } else { ZERO };
                (dot - expected).norm() < 1e-12
            })
        })
    }

    #[test]
    fn test_all_gates_unitary() {
        let gates = [
            StandardGate::I,
            StandardGate::X,
            StandardGate::Y,
            StandardGate::Z,
            StandardGate::H,
            StandardGate::S,
            StandardGate::Sdg,
            StandardGate::SX,
            StandardGate::SXdg,
            StandardGate::Rx(0.3),
            StandardGate::Ry(1.1),
            StandardGate::Rz(-0.7),
            StandardGate::U(0.4, 1.2, -2.0),
            StandardGate::CX,
            StandardGate::CY,
            StandardGate::CZ,
            StandardGate::Swap,
            StandardGate::ISwap,
        ];
        for gate in &gates {
            match gate_matrix(gate) {
                GateMatrix::Single(m) => assert!(is_unitary2(&m), "{gate:?}"),
                GateMatrix::Two(m) => assert!(is_unitary4(&m), "{gate:?}"),
            }
        }
    }

    #[test]
    fn test_sx_squares_to_x() {
        let GateMatrix::Single(sx) = gate_matrix(&StandardGate::SX) else {
            panic!("sx is single-qubit");
        };
        let x = mul2(&sx, &sx);
        let expected = pauli_x();
        for r in 0..2 {
            for c in 0..2 {
                assert!((x[r][c] - expected[r][c]).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rx_pi_is_x_up_to_phase() {
        let GateMatrix::Single(rx) = gate_matrix(&StandardGate::Rx(PI)) else {
            panic!("rx is single-qubit");
        };
        assert!(rx[0][0].norm() < 1e-12);
        assert!((rx[1][0] - Complex64::new(0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_cx_flips_target_when_control_set() {
        let GateMatrix::Two(cx) = gate_matrix(&StandardGate::CX) else {
            panic!("cx is two-qubit");
        };
        // control = bit 0, target = bit 1: |c=1,t=0⟩ (index 1) → |1,1⟩ (index 3)
        assert_eq!(cx[3][1], ONE);
        assert_eq!(cx[2][2], ONE);
    }
}
