//! N-dimensional strided iteration
//!
//! [`NdIter`] walks any [`Layout`] in row-major logical order and yields the
//! byte offset of each element relative to the start of the buffer. It is the
//! single traversal primitive behind strided copies, broadcast
//! materialisation, `map` and strided reductions.
//!
//! Advancing is a three-state machine chosen once at initialisation:
//!
//! | Mode         | Applies to            | Step                                  |
//! |--------------|-----------------------|---------------------------------------|
//! | `Flat`       | rank 0 and 1          | offset += stride                      |
//! | `Contiguous` | canonical strides     | offset += element size                |
//! | `Strided`    | everything else       | odometer carry using backstrides      |

use super::layout::{Layout, Strides, canonical_strides};
use crate::error::{Error, Result};
use smallvec::SmallVec;

type Coords = SmallVec<[usize; 4]>;

/// How [`NdIter::advance`] moves to the next element
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdvanceMode {
    /// Rank 0 or 1: a single stride
    Flat,
    /// Canonical row-major strides: step by the element size
    Contiguous,
    /// General strides, including zero strides from broadcasting
    Strided,
}

/// Row-major walker over a strided layout
#[derive(Clone, Debug)]
pub struct NdIter {
    index: usize,
    size: usize,
    coords: Coords,
    bounds: Coords,
    strides: Strides,
    backstrides: Strides,
    contiguous: bool,
    mode: AdvanceMode,
    elsize: isize,
    start: isize,
    pos: isize,
}

impl NdIter {
    /// Iterate `layout` using its own strides
    pub fn new(layout: &Layout) -> Self {
        Self::init(layout, layout.strides().iter().copied().collect())
    }

    /// Iterate `layout`'s shape with overridden strides
    ///
    /// Used to walk an operand as if it were stretched to a larger shape:
    /// pass the operand's strides with zeros in the stretched dimensions.
    pub fn with_strides(layout: &Layout, strides: &[isize]) -> Result<Self> {
        if strides.len() != layout.ndim() {
            return Err(Error::invalid_argument(
                "strides",
                format!(
                    "expected {} strides, got {}",
                    layout.ndim(),
                    strides.len()
                ),
            ));
        }
        Ok(Self::init(layout, strides.iter().copied().collect()))
    }

    fn init(layout: &Layout, strides: Strides) -> Self {
        let shape = layout.shape();
        let bounds: Coords = shape.iter().map(|&d| d.saturating_sub(1)).collect();
        let backstrides: Strides = strides
            .iter()
            .zip(bounds.iter())
            .map(|(&s, &b)| s * b as isize)
            .collect();
        let contiguous = strides == canonical_strides(shape, layout.elsize());

        let mode = if shape.len() <= 1 {
            AdvanceMode::Flat
        } else if contiguous {
            AdvanceMode::Contiguous
        } else {
            AdvanceMode::Strided
        };

        let start = layout.offset() as isize;
        Self {
            index: 0,
            size: layout.elem_count(),
            coords: SmallVec::from_elem(0, shape.len()),
            bounds,
            strides,
            backstrides,
            contiguous,
            mode,
            elsize: layout.elsize() as isize,
            start,
            pos: start,
        }
    }

    /// Move to the next element in row-major order
    #[inline]
    pub fn advance(&mut self) {
        if self.index >= self.size {
            return;
        }
        self.index += 1;

        match self.mode {
            AdvanceMode::Flat => {
                if let Some(&stride) = self.strides.first() {
                    self.pos += stride;
                    self.coords[0] += 1;
                }
            }
            AdvanceMode::Contiguous => self.pos += self.elsize,
            AdvanceMode::Strided => {
                for d in (0..self.coords.len()).rev() {
                    if self.coords[d] < self.bounds[d] {
                        self.coords[d] += 1;
                        self.pos += self.strides[d];
                        return;
                    }
                    self.coords[d] = 0;
                    self.pos -= self.backstrides[d];
                }
            }
        }
    }

    /// True once every element has been visited
    #[inline]
    pub fn is_done(&self) -> bool {
        self.index == self.size
    }

    /// Rewind to the first element
    pub fn reset(&mut self) {
        self.index = 0;
        self.coords.iter_mut().for_each(|c| *c = 0);
        self.pos = self.start;
    }

    /// Byte offset of the current element relative to the buffer start
    #[inline]
    pub fn offset(&self) -> isize {
        self.pos
    }

    /// Linear (row-major) index of the current element
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of elements the walk visits
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the strides are canonical row-major strides
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    /// The advance strategy selected at initialisation
    #[inline]
    pub fn mode(&self) -> AdvanceMode {
        self.mode
    }

    /// Per-dimension rewind distances
    #[inline]
    pub fn backstrides(&self) -> &[isize] {
        &self.backstrides
    }
}

impl Iterator for NdIter {
    type Item = isize;

    #[inline]
    fn next(&mut self) -> Option<isize> {
        if self.is_done() {
            return None;
        }
        let offset = self.pos;
        self.advance();
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NdIter {}
