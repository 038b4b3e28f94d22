//! Pauli products with an exact phase.

use num_complex::Complex64;

use qecsim_ir::{Pauli, PauliString};

/// A Pauli string times `i^phase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasedPauli {
    /// Power of `i` in the prefactor, in `0..4`.
    pub phase: u8,
    /// Tensor factors, factor `k` on code qubit `k`.
    pub ops: Vec<Pauli>,
}

/// `a · b = i^k c` for single-qubit Paulis, returned as `(k, c)`.
fn mul_single(a: Pauli, b: Pauli) -> (u8, Pauli) {
    use Pauli::{I, X, Y, Z};
    match (a, b) {
        (I, p) | (p, I) => (0, p),
        (X, X) | (Y, Y) | (Z, Z) => (0, I),
        (X, Y) => (1, Z),
        (Y, Z) => (1, X),
        (Z, X) => (1, Y),
        (Y, X) => (3, Z),
        (Z, Y) => (3, X),
        (X, Z) => (3, Y),
    }
}

impl PhasedPauli {
    /// Operator product `self · other`.
    ///
    /// Both operands must have the same length.
    pub fn mul(&self, other: &PhasedPauli) -> PhasedPauli {
        debug_assert_eq!(self.ops.len(), other.ops.len());
        let mut phase = self.phase + other.phase;
        let ops = self
            .ops
            .iter()
            .zip(&other.ops)
            .map(|(&a, &b)| {
                let (k, p) = mul_single(a, b);
                phase += k;
                p
            })
            .collect();
        PhasedPauli {
            phase: phase % 4,
            ops,
        }
    }

    /// Whether factor `qubit` flips the computational basis (X or Y).
    pub fn flips(&self, qubit: usize) -> bool {
        matches!(self.ops[qubit], Pauli::X | Pauli::Y)
    }

    /// The prefactor `i^phase`.
    pub fn prefactor(&self) -> Complex64 {
        match self.phase % 4 {
            0 => Complex64::new(1.0, 0.0),
            1 => Complex64::new(0.0, 1.0),
            2 => Complex64::new(-1.0, 0.0),
            _ => Complex64::new(0.0, -1.0),
        }
    }

    /// The factors without the phase.
    pub fn pauli_string(&self) -> PauliString {
        PauliString::new(self.ops.clone())
    }
}

impl From<&PauliString> for PhasedPauli {
    fn from(p: &PauliString) -> Self {
        PhasedPauli {
            phase: 0,
            ops: p.ops().to_vec(),
        }
    }
}
