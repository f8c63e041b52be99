//! Specialized collection helpers
//!
//! Lexicographic choose-m-of-n enumeration used by placement and validation
//! logic that has to try subsets of candidates (spawn points, receptacle
//! slots, visibility points).
//!
//! Enumeration is lazy and stack driven: each enumerator owns a private
//! stack of "next value to try" per position, so producing one combination
//! costs O(m) amortized and nothing is precomputed.

/// Invalid combination requests
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CombinationError {
    /// Asked for combinations of zero elements
    #[error("number of selected elements can't be less than 1")]
    EmptySelection,

    /// Asked for more elements than the source has
    #[error("source length {len} can't be less than number of selected elements {m}")]
    NotEnoughElements {
        /// Number of elements available
        len: usize,
        /// Number of elements requested per combination
        m: usize,
    },
}

fn validate(len: usize, m: usize) -> Result<(), CombinationError> {
    if len < m {
        return Err(CombinationError::NotEnoughElements { len, m });
    }
    if m < 1 {
        return Err(CombinationError::EmptySelection);
    }
    Ok(())
}

/// Lazy enumerator of every m-subset of `0..n` as sorted index tuples
#[derive(Debug, Clone)]
pub struct IndexCombinations {
    n: usize,
    current: Vec<usize>,
    stack: Vec<usize>,
}

impl IndexCombinations {
    fn new(n: usize, m: usize) -> Self {
        let mut stack = Vec::with_capacity(m);
        stack.push(0);
        Self {
            n,
            current: vec![0; m],
            stack,
        }
    }

    /// Advance to the next combination, leaving it in `self.current`
    fn advance(&mut self) -> bool {
        let m = self.current.len();
        while let Some(mut value) = self.stack.pop() {
            let mut index = self.stack.len();
            while value < self.n {
                self.current[index] = value;
                index += 1;
                value += 1;
                self.stack.push(value);
                if index == m {
                    return true;
                }
            }
        }
        false
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().then(|| self.current.clone())
    }
}

/// Enumerate every m-subset of `0..n` in lexicographic order.
///
/// The first tuple is always `[0, 1, ..., m - 1]`.
pub fn index_combinations(n: usize, m: usize) -> Result<IndexCombinations, CombinationError> {
    validate(n, m)?;
    Ok(IndexCombinations::new(n, m))
}

/// Streaming enumerator of m-element combinations of a slice.
///
/// Each call to [`Combinations::next_combination`] overwrites one internal
/// buffer, so the returned slice borrows the enumerator and cannot be kept
/// across calls. Clone it with `to_vec()` when it has to outlive the step.
#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    source: &'a [T],
    indices: IndexCombinations,
    buffer: Vec<T>,
}

impl<'a, T: Clone> Combinations<'a, T> {
    /// Produce the next combination, or `None` once every one has been yielded
    pub fn next_combination(&mut self) -> Option<&[T]> {
        if !self.indices.advance() {
            return None;
        }
        self.buffer.clear();
        self.buffer
            .extend(self.indices.current.iter().map(|&i| self.source[i].clone()));
        Some(&self.buffer)
    }

    /// Visit every remaining combination in order
    pub fn for_each_combination(mut self, mut visit: impl FnMut(&[T])) {
        while let Some(combination) = self.next_combination() {
            visit(combination);
        }
    }
}

/// Enumerate every m-element combination of `array` in lexicographic index order
pub fn combinations<T: Clone>(array: &[T], m: usize) -> Result<Combinations<'_, T>, CombinationError> {
    validate(array.len(), m)?;
    Ok(Combinations {
        source: array,
        indices: IndexCombinations::new(array.len(), m),
        buffer: Vec::with_capacity(m),
    })
}
