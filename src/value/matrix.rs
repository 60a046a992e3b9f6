//! Rectangular N-dimensional array of Values (`spec.md` §3.3).

use crate::value::Slot;
use calc_asm::ErrorCode;

/// Inclusive `[min, max]` bound for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bound {
    pub min: i64,
    pub max: i64,
}

impl Bound {
    pub fn span(self) -> i64 {
        self.max - self.min + 1
    }
}

/// N-dimensional (N <= 4) rectangular array, row-major, last index varies
/// fastest.
#[derive(Debug, Clone)]
pub struct Matrix {
    bounds: Vec<Bound>,
    elements: Vec<Slot>,
}

impl Matrix {
    /// Build a matrix of the given per-axis bounds, every slot `Null`.
    pub fn new(bounds: Vec<Bound>) -> Self {
        let size: usize = bounds.iter().map(|b| b.span().max(0) as usize).product();
        let size = if bounds.is_empty() { 1 } else { size };
        let elements = (0..size)
            .map(|_| crate::value::new_slot(crate::value::Value::null()))
            .collect();
        Matrix { bounds, elements }
    }

    pub fn rank(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    pub fn elements(&self) -> &[Slot] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Compute the flat offset for an index tuple, per `spec.md` §3.3:
    /// `offset = sum (idx_i - min_i) * prod_{j>i}(span_j)`.
    pub fn offset(&self, indices: &[i64]) -> Result<usize, ErrorCode> {
        if indices.len() != self.bounds.len() {
            return Err(ErrorCode::BadSubscript);
        }
        let mut offset: i64 = 0;
        for (axis, (&idx, bound)) in indices.iter().zip(self.bounds.iter()).enumerate() {
            if idx < bound.min || idx > bound.max {
                return Err(ErrorCode::BadSubscript);
            }
            let trailing_span: i64 = self.bounds[axis + 1..].iter().map(|b| b.span()).product();
            offset += (idx - bound.min) * trailing_span;
        }
        Ok(offset as usize)
    }

    pub fn slot_at(&self, indices: &[i64]) -> Result<Slot, ErrorCode> {
        let off = self.offset(indices)?;
        Ok(self.elements[off].clone())
    }

    pub fn slot_at_position(&self, position: usize) -> Option<&Slot> {
        self.elements.get(position)
    }

    /// Transpose a rank-2 matrix, matching `spec.md` §8's round-trip
    /// invariant "matrix transpose is an involution".
    pub fn transpose(&self) -> Option<Matrix> {
        if self.rank() != 2 {
            return None;
        }
        let rows = self.bounds[0];
        let cols = self.bounds[1];
        let mut out = Matrix::new(vec![cols, rows]);
        for r in 0..rows.span() {
            for c in 0..cols.span() {
                let src = self
                    .slot_at(&[rows.min + r, cols.min + c])
                    .expect("indices within bounds");
                let dst_idx = [cols.min + c, rows.min + r];
                let dst_off = out.offset(&dst_idx).expect("indices within bounds");
                out.elements[dst_off] = src;
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_matches_row_major_layout() {
        let m = Matrix::new(vec![Bound { min: 0, max: 1 }, Bound { min: 0, max: 2 }]);
        assert_eq!(m.offset(&[0, 0]).unwrap(), 0);
        assert_eq!(m.offset(&[0, 2]).unwrap(), 2);
        assert_eq!(m.offset(&[1, 0]).unwrap(), 3);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let m = Matrix::new(vec![Bound { min: 0, max: 1 }]);
        assert_eq!(m.offset(&[5]), Err(ErrorCode::BadSubscript));
    }

    #[test]
    fn transpose_is_an_involution() {
        let m = Matrix::new(vec![Bound { min: 0, max: 1 }, Bound { min: 0, max: 2 }]);
        let back = m.transpose().unwrap().transpose().unwrap();
        assert_eq!(back.bounds(), m.bounds());
    }
}
