//! The interpolated flow field: sparse columns of per-pixel vectors.

use std::cmp::Ordering;

use crate::interpolate::round_half_up;

/// Magnitude of a field vector, with sentinels below every real value.
///
/// Ordered `Nil < Invisible < Visible(_)`; visible magnitudes compare by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Magnitude {
    /// Outside the domain.
    Nil,
    /// Inside the domain but not displayed.
    Invisible,
    /// Displayed, in source units (knots).
    Visible(f64),
}

impl Magnitude {
    fn rank(&self) -> u8 {
        match self {
            Magnitude::Nil => 0,
            Magnitude::Invisible => 1,
            Magnitude::Visible(_) => 2,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Magnitude::Nil)
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Magnitude::Visible(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Magnitude::Visible(m) => Some(*m),
            _ => None,
        }
    }
}

impl PartialOrd for Magnitude {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Magnitude::Visible(a), Magnitude::Visible(b)) => a.partial_cmp(b),
            _ => Some(self.rank().cmp(&other.rank())),
        }
    }
}

/// `(u, v)` in pixels per frame plus the magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldVector {
    pub u: f64,
    pub v: f64,
    pub magnitude: Magnitude,
}

impl FieldVector {
    /// Returned for every lookup outside the field.
    pub const NIL: FieldVector = FieldVector {
        u: f64::NAN,
        v: f64::NAN,
        magnitude: Magnitude::Nil,
    };
}

/// One column of the field: rows `start_row..start_row + cells.len()`.
///
/// Cells are `None` where the field mask is false inside the span.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub start_row: i32,
    pub cells: Vec<Option<FieldVector>>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, y: i32) -> Option<&FieldVector> {
        let row = y - self.start_row;
        if row < 0 {
            return None;
        }
        self.cells.get(row as usize).and_then(Option::as_ref)
    }
}

/// Immutable flow field for one time slice.
#[derive(Debug, Clone)]
pub struct Field {
    /// Pixel x of `columns[0]`
    x_origin: i32,
    columns: Vec<Option<Column>>,
    /// `weights[i]` = number of rows in columns before `i`
    weights: Vec<usize>,
    /// Slice timestamp the field was built from
    date: String,
}

impl Field {
    pub fn new(x_origin: i32, columns: Vec<Option<Column>>, date: impl Into<String>) -> Self {
        let mut weights = Vec::with_capacity(columns.len() + 1);
        weights.push(0);
        let mut total = 0;
        for column in &columns {
            total += column.as_ref().map_or(0, Column::len);
            weights.push(total);
        }
        Self {
            x_origin,
            columns,
            weights,
            date: date.into(),
        }
    }

    /// Vector at a pixel position (rounded), or [`FieldVector::NIL`].
    pub fn sample(&self, x: f64, y: f64) -> FieldVector {
        if !x.is_finite() || !y.is_finite() {
            return FieldVector::NIL;
        }
        let index = round_half_up(x) - self.x_origin;
        if index < 0 {
            return FieldVector::NIL;
        }
        self.columns
            .get(index as usize)
            .and_then(Option::as_ref)
            .and_then(|column| column.get(round_half_up(y)))
            .copied()
            .unwrap_or(FieldVector::NIL)
    }

    pub fn x_origin(&self) -> i32 {
        self.x_origin
    }

    pub fn columns(&self) -> &[Option<Column>] {
        &self.columns
    }

    /// Prefix sums of column lengths, one longer than `columns()`.
    pub fn weights(&self) -> &[usize] {
        &self.weights
    }

    /// Total rows across all columns.
    pub fn total_weight(&self) -> usize {
        self.weights.last().copied().unwrap_or(0)
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}
