use serde::{Deserialize, Serialize};
use std::fmt;

/// A resizable vector of `f64` values with an active window.
///
/// `first` and `last` delimit the positions that take part in the current
/// operation; everything outside the window is carried along untouched.
/// A scalar is a vector whose window holds exactly one element.
///
/// Invariant: `first <= last < values.len()` whenever the buffer is
/// non-empty. An empty buffer is a valid empty vector.
///
/// Serialized as a plain JSON array of the active elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct Vector {
    values: Vec<f64>,
    first: usize,
    last: usize,
}

impl Vector {
    /// Create a vector whose window spans every element.
    pub fn new(values: Vec<f64>) -> Self {
        let last = values.len().saturating_sub(1);
        Self {
            values,
            first: 0,
            last,
        }
    }

    /// Create a length-1 vector.
    pub fn scalar(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Create an empty vector.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Create a vector over `values` whose window is `first..=last`.
    ///
    /// Returns `None` when the window falls outside the buffer or is
    /// inverted.
    pub fn with_window(values: Vec<f64>, first: usize, last: usize) -> Option<Self> {
        if first > last || last >= values.len() {
            return None;
        }
        Some(Self {
            values,
            first,
            last,
        })
    }

    /// Number of elements in the active window.
    pub fn len(&self) -> usize {
        if self.values.is_empty() {
            0
        } else {
            self.last - self.first + 1
        }
    }

    /// Returns `true` if the window holds no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if the window holds exactly one element.
    pub fn is_scalar(&self) -> bool {
        self.len() == 1
    }

    /// Index of the first active element in the backing buffer.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Index of the last active element in the backing buffer.
    pub fn last(&self) -> usize {
        self.last
    }

    /// Length of the whole backing buffer, window or not.
    pub fn backing_len(&self) -> usize {
        self.values.len()
    }

    /// The whole backing buffer.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The active elements.
    pub fn active(&self) -> &[f64] {
        if self.values.is_empty() {
            &[]
        } else {
            &self.values[self.first..=self.last]
        }
    }

    /// The active elements, mutably.
    pub fn active_mut(&mut self) -> &mut [f64] {
        if self.values.is_empty() {
            &mut []
        } else {
            &mut self.values[self.first..=self.last]
        }
    }

    /// Element `index` of the active window.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.active().get(index).copied()
    }

    /// Consume the vector, keeping only the active elements.
    pub fn into_values(mut self) -> Vec<f64> {
        if !self.values.is_empty() {
            self.values.truncate(self.last + 1);
            self.values.drain(..self.first);
        }
        self.values
    }

    /// Drop everything outside the window so it spans the whole buffer.
    pub fn compact(self) -> Self {
        if self.first == 0 && self.last + 1 >= self.values.len() {
            self
        } else {
            Self::new(self.into_values())
        }
    }
}

impl Default for Vector {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<Vector> for Vec<f64> {
    fn from(vector: Vector) -> Self {
        vector.into_values()
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, x) in self.active().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{x}")?;
        }
        Ok(())
    }
}
