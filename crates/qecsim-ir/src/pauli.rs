//! Pauli operators and strings.
//!
//! A [`PauliString`] is positional: factor `k` acts on the `k`-th qubit of
//! whatever qubit list it is paired with (a snapshot's qubits, or the code
//! block). `"XZZXI"` on qubits `[q0..q4]` puts X on q0 and I on q4.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IrError;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Whether two single-qubit Paulis anticommute.
    #[inline]
    pub fn anticommutes_with(self, other: Pauli) -> bool {
        self != Pauli::I && other != Pauli::I && self != other
    }

    /// The character used in Pauli-string text.
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }
}

impl TryFrom<char> for Pauli {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'I' => Ok(Pauli::I),
            'X' => Ok(Pauli::X),
            'Y' => Ok(Pauli::Y),
            'Z' => Ok(Pauli::Z),
            other => Err(other),
        }
    }
}

/// A positional tensor product of Pauli operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PauliString {
    ops: Vec<Pauli>,
}

impl PauliString {
    /// Construct from a list of factors.
    pub fn new(ops: Vec<Pauli>) -> Self {
        Self { ops }
    }

    /// The all-identity string of the given length.
    pub fn identity(len: usize) -> Self {
        Self {
            ops: vec![Pauli::I; len],
        }
    }

    /// `len` copies of the same factor, e.g. `ZZZZZ`.
    pub fn uniform(op: Pauli, len: usize) -> Self {
        Self { ops: vec![op; len] }
    }

    /// A single factor `op` at position `position`, identity elsewhere.
    pub fn single(op: Pauli, position: usize, len: usize) -> Self {
        let mut ops = vec![Pauli::I; len];
        ops[position] = op;
        Self { ops }
    }

    /// The factors in positional order.
    pub fn ops(&self) -> &[Pauli] {
        &self.ops
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if the string has no factors.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.ops.iter().filter(|p| **p != Pauli::I).count()
    }

    /// Whether two strings of equal length commute.
    pub fn commutes_with(&self, other: &PauliString) -> bool {
        self.ops
            .iter()
            .zip(&other.ops)
            .filter(|(a, b)| a.anticommutes_with(**b))
            .count()
            % 2
            == 0
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{}", op.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for PauliString {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IrError::InvalidPauli {
                text: s.to_string(),
                reason: "empty string".into(),
            });
        }
        let ops = s
            .chars()
            .map(Pauli::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|c| IrError::InvalidPauli {
                text: s.to_string(),
                reason: format!("unexpected character '{c}'"),
            })?;
        Ok(Self { ops })
    }
}

impl TryFrom<String> for PauliString {
    type Error = IrError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PauliString> for String {
    fn from(p: PauliString) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let p: PauliString = "XZZXI".parse().unwrap();
        assert_eq!(p.len(), 5);
        assert_eq!(p.weight(), 4);
        assert_eq!(p.ops()[0], Pauli::X);
        assert_eq!(p.ops()[4], Pauli::I);
        assert_eq!(p.to_string(), "XZZXI");
    }

    #[test]
    fn test_lowercase_accepted() {
        let p: PauliString = "zzzzz".parse().unwrap();
        assert_eq!(p, PauliString::uniform(Pauli::Z, 5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("XQZ".parse::<PauliString>().is_err());
        assert!("".parse::<PauliString>().is_err());
    }

    #[test]
    fn test_commutation() {
        let g1: PauliString = "XZZXI".parse().unwrap();
        let g2: PauliString = "IXZZX".parse().unwrap();
        let x: PauliString = "XIIII".parse().unwrap();
        assert!(g1.commutes_with(&g2));
        // X on qubit 0 commutes with g1 (X there) but anticommutes with ZXIXZ.
        let g4: PauliString = "ZXIXZ".parse().unwrap();
        assert!(x.commutes_with(&g1));
        assert!(!x.commutes_with(&g4));
    }

    #[test]
    fn test_single() {
        let p = PauliString::single(Pauli::Y, 2, 5);
        assert_eq!(p.to_string(), "IIYII");
    }

    #[test]
    fn test_serde_as_text() {
        let p: PauliString = "XXXXX".parse().unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"XXXXX\"");
        let back: PauliString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
