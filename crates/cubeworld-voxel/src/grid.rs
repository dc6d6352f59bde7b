//! Flat bit-packed voxel grid.

use cubeworld_core::coords::{ChunkDims, LocalPos};

const WORD_BITS: usize = u64::BITS as usize;

/// One presence bit per cell of a chunk-sized box.
///
/// Bits are laid out by [`ChunkDims::index`], so the cells of a z-row are
/// contiguous and a column `(x, z)` is strided by `size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    dims: ChunkDims,
    words: Vec<u64>,
    solid: usize,
}

impl VoxelGrid {
    /// Create an all-empty grid.
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            words: vec![0; dims.volume().div_ceil(WORD_BITS)],
            solid: 0,
        }
    }

    /// Create a fully solid grid.
    pub fn filled(dims: ChunkDims) -> Self {
        let mut grid = Self::new(dims);
        let volume = dims.volume();
        for word in &mut grid.words {
            *word = u64::MAX;
        }
        // clear the padding bits past the last cell
        let tail = volume % WORD_BITS;
        if tail != 0 {
            if let Some(last) = grid.words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        grid.solid = volume;
        grid
    }

    /// Grid extent.
    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    fn bit(&self, local: LocalPos) -> (usize, u64) {
        let index = self.dims.index(local);
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    /// Whether the cell is solid. Out-of-range positions are empty.
    #[inline]
    pub fn get(&self, local: LocalPos) -> bool {
        if !self.dims.contains(local) {
            return false;
        }
        let (word, mask) = self.bit(local);
        self.words[word] & mask != 0
    }

    /// Set a cell, returning whether its state changed.
    ///
    /// Out-of-range positions are a no-op.
    pub fn set(&mut self, local: LocalPos, solid: bool) -> bool {
        if !self.dims.contains(local) {
            return false;
        }
        let (word, mask) = self.bit(local);
        let was_solid = self.words[word] & mask != 0;
        if was_solid == solid {
            return false;
        }
        if solid {
            self.words[word] |= mask;
            self.solid += 1;
        } else {
            self.words[word] &= !mask;
            self.solid -= 1;
        }
        true
    }

    /// Make `y ∈ [0, height)` solid in column `(x, z)`; heights past the top
    /// of the grid are clamped.
    pub fn fill_column(&mut self, x: u32, z: u32, height: u32) {
        for y in 0..height.min(self.dims.height) {
            self.set(LocalPos::new(x, y, z), true);
        }
    }

    /// Highest solid `y` in column `(x, z)`, scanning downward from the top.
    pub fn column_top(&self, x: u32, z: u32) -> Option<u32> {
        (0..self.dims.height)
            .rev()
            .find(|&y| self.get(LocalPos::new(x, y, z)))
    }

    /// Number of solid cells.
    #[inline]
    pub fn count(&self) -> usize {
        self.solid
    }

    /// Check if every cell is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.solid == 0
    }

    /// Iterate solid cells in storage order.
    pub fn iter_solid(&self) -> impl Iterator<Item = LocalPos> + '_ {
        let dims = self.dims;
        self.words
            .iter()
            .enumerate()
            .flat_map(move |(word_index, &word)| {
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let offset = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    Some(dims.from_index(word_index * WORD_BITS + offset))
                })
            })
    }

    /// Get memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.words.len() * std::mem::size_of::<u64>()
    }
}
