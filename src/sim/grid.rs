// Flat row-major storage shared by every field of the simulation

use std::ops::{Index, IndexMut};

/// A fixed-size 2D field stored as one contiguous row-major buffer.
///
/// Cell `(row, col)` lives at offset `row * nx + col`. The buffer is
/// allocated once and never resized.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    nx: usize,
    ny: usize,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`
    ///
    /// Parameters
    /// - `nx` - The number of columns
    /// - `ny` - The number of rows
    /// - `value` - The initial cell value
    pub fn from_element(nx: usize, ny: usize, value: T) -> Self {
        Grid {
            data: vec![value; nx * ny],
            nx,
            ny,
        }
    }

    /// Overwrite this grid with the contents of `other` without reallocating.
    pub fn assign(&mut self, other: &Grid<T>) {
        debug_assert_eq!(self.shape(), other.shape());
        self.data.clone_from_slice(&other.data);
    }

    /// Set every cell to `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer. Returns `None` when the buffer
    /// length does not match `nx * ny`.
    pub fn from_vec(nx: usize, ny: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != nx * ny {
            return None;
        }
        Some(Grid { data, nx, ny })
    }

    /// Build a grid by evaluating `f(row, col)` for every cell
    pub fn from_fn(nx: usize, ny: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nx * ny);
        for row in 0..ny {
            for col in 0..nx {
                data.push(f(row, col));
            }
        }
        Grid { data, nx, ny }
    }

    /// Flat offset of `(row, col)`. Unchecked; callers keep loops in range.
    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.ny && col < self.nx);
        row * self.nx + col
    }

    /// Bounds-checked access
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.ny && col < self.nx {
            self.data.get(self.idx(row, col))
        } else {
            None
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// `(nx, ny)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Iterate over the `(row, col)` pairs strictly inside the boundary ring
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize)> + use<T> {
        let (nx, ny) = (self.nx, self.ny);
        (1..ny.saturating_sub(1))
            .flat_map(move |row| (1..nx.saturating_sub(1)).map(move |col| (row, col)))
    }

    /// Apply `f` element-wise into a new grid of the same shape
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            data: self.data.iter().map(f).collect(),
            nx: self.nx,
            ny: self.ny,
        }
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[self.idx(row, col)]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let k = self.idx(row, col);
        &mut self.data[k]
    }
}
