//! Parallel numeric streams backing the batch primitives.
//!
//! A `Streams<N>` is `N` columns of `f64` (x, y, radius, ...) that always have
//! the same length. The columns are private, so the only way to change them is
//! through methods that keep them in step; anything else is a contract error.

use glam::{DVec2, dvec2};

use crate::errors::ContractViolation;

#[derive(Clone, Debug, PartialEq)]
pub struct Streams<const N: usize> {
    columns: [Vec<f64>; N],
}

impl<const N: usize> Default for Streams<N> {
    fn default() -> Self {
        Self {
            columns: std::array::from_fn(|_| Vec::new()),
        }
    }
}

impl<const N: usize> Streams<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from separate columns, which must all have the same length.
    pub fn from_columns(columns: [Vec<f64>; N]) -> Result<Self, ContractViolation> {
        let expected = columns.first().map_or(0, Vec::len);
        for (column, values) in columns.iter().enumerate() {
            if values.len() != expected {
                return Err(ContractViolation::LengthMismatch {
                    column,
                    expected,
                    found: values.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Build from row-major values `[a0, b0, a1, b1, ...]`.
    pub fn from_interleaved(values: &[f64]) -> Result<Self, ContractViolation> {
        let mut s = Self::new();
        s.extend_interleaved(values)?;
        Ok(s)
    }

    /// Number of distinct streams per row.
    #[inline]
    pub const fn arity(&self) -> usize {
        N
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, row: [f64; N]) {
        for (column, v) in self.columns.iter_mut().zip(row) {
            column.push(v);
        }
    }

    /// Append row-major values; the length must be a multiple of `N`.
    pub fn extend_interleaved(&mut self, values: &[f64]) -> Result<(), ContractViolation> {
        if N == 0 || values.len() % N != 0 {
            return Err(ContractViolation::RaggedInterleaved {
                len: values.len(),
                arity: N,
            });
        }
        for chunk in values.chunks_exact(N) {
            for (column, v) in self.columns.iter_mut().zip(chunk) {
                column.push(*v);
            }
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<[f64; N], ContractViolation> {
        self.check_index(index)?;
        Ok(std::array::from_fn(|k| self.columns[k][index]))
    }

    pub fn set(&mut self, index: usize, row: [f64; N]) -> Result<(), ContractViolation> {
        self.check_index(index)?;
        for (column, v) in self.columns.iter_mut().zip(row) {
            column[index] = v;
        }
        Ok(())
    }

    pub fn last(&self) -> Option<[f64; N]> {
        self.len().checked_sub(1).and_then(|i| self.get(i).ok())
    }

    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
    }

    pub fn column(&self, k: usize) -> &[f64] {
        &self.columns[k]
    }

    pub fn rows(&self) -> impl Iterator<Item = [f64; N]> + '_ {
        (0..self.len()).map(move |i| std::array::from_fn(|k| self.columns[k][i]))
    }

    fn check_index(&self, index: usize) -> Result<(), ContractViolation> {
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(ContractViolation::IndexOutOfRange { index, len })
        }
    }
}

impl Streams<2> {
    /// Rows as points.
    pub fn points(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.rows().map(|[x, y]| dvec2(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_rejects_mismatched_lengths() {
        let err = Streams::<3>::from_columns([vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0]])
            .unwrap_err();
        assert_eq!(
            err,
            ContractViolation::LengthMismatch {
                column: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn interleaved_values_split_into_rows() {
        let s = Streams::<3>::from_interleaved(&[10.0, 20.0, 1.0, 30.0, 40.0, 2.0]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.arity(), 3);
        assert_eq!(s.column(0), &[10.0, 30.0]);
        assert_eq!(s.column(2), &[1.0, 2.0]);
        assert_eq!(s.get(1).unwrap(), [30.0, 40.0, 2.0]);
    }

    #[test]
    fn ragged_interleaved_is_rejected() {
        let err = Streams::<2>::from_interleaved(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, ContractViolation::RaggedInterleaved { len: 3, arity: 2 });
    }

    #[test]
    fn failed_extend_leaves_streams_untouched() {
        let mut s = Streams::<2>::from_interleaved(&[1.0, 2.0]).unwrap();
        assert!(s.extend_interleaved(&[5.0]).is_err());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn index_out_of_range() {
        let mut s = Streams::<2>::new();
        s.push([1.0, 2.0]);
        assert_eq!(
            s.get(1).unwrap_err(),
            ContractViolation::IndexOutOfRange { index: 1, len: 1 }
        );
        assert!(s.set(3, [0.0, 0.0]).is_err());
        s.set(0, [7.0, 8.0]).unwrap();
        assert_eq!(s.last(), Some([7.0, 8.0]));
    }

    #[test]
    fn clear_empties_every_column() {
        let mut s = Streams::<4>::from_interleaved(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.last(), None);
        assert_eq!(s.rows().count(), 0);
    }
}
