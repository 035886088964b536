//! Minimal crystal model: lattice vectors plus reduced atomic positions.

use super::constants::{BOHR, PI2};
use crate::domain::{DeckValue, OptError, OptResult};
use serde::Deserialize;

pub type Matrix3 = [[f64; 3]; 3];

/// Real-space lattice, one vector per row, in Angstrom.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Lattice {
    vectors: Matrix3,
}

impl Lattice {
    pub fn new(vectors: Matrix3) -> OptResult<Self> {
        if determinant(&vectors).abs() <= 1.0e-12 {
            return Err(OptError::configuration(
                "CONFIG.SINGULAR_LATTICE",
                "lattice vectors are linearly dependent",
            ));
        }
        Ok(Self { vectors })
    }

    pub fn cubic(a: f64) -> OptResult<Self> {
        Self::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    pub fn vectors(&self) -> &Matrix3 {
        &self.vectors
    }

    pub fn volume(&self) -> f64 {
        determinant(&self.vectors).abs()
    }

    /// Reciprocal lattice with the 2π convention, one vector per row.
    pub fn reciprocal(&self) -> OptResult<Matrix3> {
        let inverse = inverse(&self.vectors)?;
        let mut reciprocal = [[0.0; 3]; 3];
        for (i, row) in reciprocal.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = PI2 * inverse[j][i];
            }
        }
        Ok(reciprocal)
    }

    pub fn reciprocal_inverse(&self) -> OptResult<Matrix3> {
        inverse(&self.reciprocal()?)
    }

    /// Vectors in Bohr, the unit the solver reads `rprim` in when
    /// `acell` is 1.
    pub fn vectors_bohr(&self) -> Matrix3 {
        self.vectors.map(|row| row.map(|value| value / BOHR))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Structure {
    pub lattice: Lattice,
    /// Atomic number of each species.
    pub znucl: Vec<u32>,
    /// 1-based species index of each site.
    pub typat: Vec<usize>,
    pub xred: Vec<[f64; 3]>,
}

impl Structure {
    pub fn validate(&self) -> OptResult<()> {
        Lattice::new(*self.lattice.vectors())?;
        if self.xred.is_empty() {
            return Err(OptError::configuration(
                "CONFIG.STRUCTURE",
                "structure has no atomic sites",
            ));
        }
        if self.typat.len() != self.xred.len() {
            return Err(OptError::configuration(
                "CONFIG.STRUCTURE",
                format!(
                    "structure has {} species indices for {} sites",
                    self.typat.len(),
                    self.xred.len()
                ),
            ));
        }
        if let Some(bad) = self
            .typat
            .iter()
            .find(|index| **index == 0 || **index > self.znucl.len())
        {
            return Err(OptError::configuration(
                "CONFIG.STRUCTURE",
                format!(
                    "species index {bad} is outside 1..={}",
                    self.znucl.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn input_variables(&self) -> OptResult<Vec<(&'static str, Option<DeckValue>)>> {
        self.validate()?;
        Ok(vec![
            ("acell", Some(DeckValue::from(vec![1.0, 1.0, 1.0]))),
            ("rprim", Some(DeckValue::from(self.lattice.vectors_bohr().to_vec()))),
            ("natom", Some(DeckValue::from(self.xred.len()))),
            ("ntypat", Some(DeckValue::from(self.znucl.len()))),
            (
                "typat",
                Some(DeckValue::from(
                    self.typat.iter().map(|index| *index as i64).collect::<Vec<_>>(),
                )),
            ),
            (
                "znucl",
                Some(DeckValue::from(
                    self.znucl.iter().map(|z| i64::from(*z)).collect::<Vec<_>>(),
                )),
            ),
            ("xred", Some(DeckValue::from(self.xred.clone()))),
        ])
    }
}

pub fn determinant(m: &Matrix3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

pub fn inverse(m: &Matrix3) -> OptResult<Matrix3> {
    let det = determinant(m);
    if det.abs() <= 1.0e-12 {
        return Err(OptError::configuration(
            "CONFIG.SINGULAR_LATTICE",
            "matrix is singular and cannot be inverted",
        ));
    }
    let cofactor = |r0: usize, r1: usize, c0: usize, c1: usize| {
        m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
    };
    // Adjugate, transposed in place.
    let adj = [
        [cofactor(1, 2, 1, 2), -cofactor(0, 2, 1, 2), cofactor(0, 1, 1, 2)],
        [-cofactor(1, 2, 0, 2), cofactor(0, 2, 0, 2), -cofactor(0, 1, 0, 2)],
        [cofactor(1, 2, 0, 1), -cofactor(0, 2, 0, 1), cofactor(0, 1, 0, 1)],
    ];
    Ok(adj.map(|row| row.map(|value| value / det)))
}

/// Row vector times matrix.
pub fn row_times(v: [f64; 3], m: &Matrix3) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (j, value) in out.iter_mut().enumerate() {
        *value = v[0] * m[0][j] + v[1] * m[1][j] + v[2] * m[2][j];
    }
    out
}
