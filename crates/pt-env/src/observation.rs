//! Dense row-major observation matrix.

/// Which feature columns an environment emits per ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeatureSet {
    /// `[value, priority, wait]`
    Baseline,
    /// Baseline plus `[bottleneck, emb_mean, emb_std, emb_max, domain]`.
    Enriched,
}

impl FeatureSet {
    pub const fn width(self) -> usize {
        match self {
            FeatureSet::Baseline => 3,
            FeatureSet::Enriched => 8,
        }
    }
}

/// A `rows × cols` matrix of `f32` features, one row per backlog slot.
///
/// Rows beyond the current backlog length are all zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Observation {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.cols.max(1))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0.0)
    }
}
