//! Named axes.
//!
//! An [`Axis`] is identified by its name *and* its length, so two tensors line up
//! on an axis only when both agree. [`Axes`] is an ordered collection of distinct
//! axes describing the layout of a tensor.

use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};

/// A single named axis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Axis {
    name: String,
    length: usize,
}

impl Axis {
    pub fn new(name: impl Into<String>, length: usize) -> Self {
        Self { name: name.into(), length }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.length)
    }
}

/// Ordered collection of distinct axes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Axes {
    axes: Vec<Axis>,
}

impl Axes {
    /// Create a collection, rejecting repeated axes
    pub fn new(axes: Vec<Axis>) -> Result<Self> {
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].contains(axis) {
                return Err(Error::AxisMismatch(format!("axis {} appears more than once", axis)));
            }
        }
        Ok(Self { axes })
    }

    /// Axes of a scalar
    pub fn scalar() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Axis> {
        self.axes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    pub fn first(&self) -> Option<&Axis> {
        self.axes.first()
    }

    pub fn last(&self) -> Option<&Axis> {
        self.axes.last()
    }

    pub fn as_slice(&self) -> &[Axis] {
        &self.axes
    }

    pub fn contains(&self, axis: &Axis) -> bool {
        self.axes.contains(axis)
    }

    pub fn index_of(&self, axis: &Axis) -> Option<usize> {
        self.axes.iter().position(|a| a == axis)
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::length).collect()
    }

    /// Total number of elements of a tensor with these axes
    pub fn size(&self) -> usize {
        self.axes.iter().map(Axis::length).product()
    }

    /// Axes at the given positions, in the given order
    pub fn select(&self, indices: &[usize]) -> Result<Axes> {
        let picked = indices
            .iter()
            .map(|&i| {
                self.axes.get(i).cloned().ok_or_else(|| {
                    Error::AxisMismatch(format!("axis index {} out of range for {}", i, self))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Axes::new(picked)
    }

    /// Axes of `self` that are not in `other`, order preserved
    pub fn without(&self, other: &Axes) -> Axes {
        Self {
            axes: self.axes.iter().filter(|a| !other.contains(a)).cloned().collect(),
        }
    }

    /// Axes of `self` followed by the axes of `other` not already present
    pub fn union(&self, other: &Axes) -> Axes {
        let mut axes = self.axes.clone();
        axes.extend(other.iter().filter(|a| !self.contains(a)).cloned());
        Self { axes }
    }

    /// Axes shared with `other`, in the order of `self`
    pub fn intersection(&self, other: &Axes) -> Axes {
        Self {
            axes: self.axes.iter().filter(|a| other.contains(a)).cloned().collect(),
        }
    }

    /// Insert `axis` so that it ends up at `position`
    pub fn insert(&self, position: usize, axis: Axis) -> Result<Axes> {
        if position > self.axes.len() {
            return Err(Error::AxisMismatch(format!(
                "cannot insert axis {} at position {} of {}",
                axis, position, self
            )));
        }
        let mut axes = self.axes.clone();
        axes.insert(position, axis);
        Axes::new(axes)
    }

    /// Same set of axes regardless of order
    pub fn same_set(&self, other: &Axes) -> bool {
        self.len() == other.len() && self.axes.iter().all(|a| other.contains(a))
    }
}

impl Index<usize> for Axes {
    type Output = Axis;

    fn index(&self, index: usize) -> &Axis {
        &self.axes[index]
    }
}

impl<'a> IntoIterator for &'a Axes {
    type Item = &'a Axis;
    type IntoIter = std::slice::Iter<'a, Axis>;

    fn into_iter(self) -> Self::IntoIter {
        self.axes.iter()
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, axis) in self.axes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", axis)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(spec: &[(&str, usize)]) -> Axes {
        Axes::new(spec.iter().map(|(n, l)| Axis::new(*n, *l)).collect()).unwrap()
    }

    #[test]
    fn test_axis_identity_includes_length() {
        assert_eq!(Axis::new("N", 2), Axis::new("N", 2));
        assert_ne!(Axis::new("N", 2), Axis::new("N", 1));
    }

    #[test]
    fn test_duplicate_axes_rejected() {
        let result = Axes::new(vec![Axis::new("N", 2), Axis::new("N", 2)]);
        assert!(matches!(result, Err(Error::AxisMismatch(_))));

        // Same name with a different length is a different axis
        assert!(Axes::new(vec![Axis::new("N", 2), Axis::new("N", 1)]).is_ok());
    }

    #[test]
    fn test_set_operations() {
        let a = axes(&[("N", 2), ("C", 3), ("H", 4)]);
        let b = axes(&[("H", 4), ("W", 5)]);

        assert_eq!(a.without(&b), axes(&[("N", 2), ("C", 3)]));
        assert_eq!(a.union(&b), axes(&[("N", 2), ("C", 3), ("H", 4), ("W", 5)]));
        assert_eq!(a.intersection(&b), axes(&[("H", 4)]));
        assert_eq!(a.lengths(), vec![2, 3, 4]);
        assert_eq!(a.size(), 24);
    }

    #[test]
    fn test_select_and_insert() {
        let a = axes(&[("N", 2), ("C", 3), ("H", 4)]);

        assert_eq!(a.select(&[2, 0]).unwrap(), axes(&[("H", 4), ("N", 2)]));
        assert!(a.select(&[3]).is_err());

        let inserted = a.insert(1, Axis::new("C", 1)).unwrap();
        assert_eq!(inserted.lengths(), vec![2, 1, 3, 4]);
        assert!(a.insert(4, Axis::new("X", 1)).is_ok());
        assert!(a.insert(5, Axis::new("X", 1)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(axes(&[("N", 2), ("C", 3)]).to_string(), "(N:2, C:3)");
        assert_eq!(Axes::scalar().to_string(), "()");
    }
}
