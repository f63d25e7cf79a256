//! PELT (Pruned Exact Linear Time) changepoint search.
//!
//! Exact multiple-changepoint detection with pruning of candidate split
//! points that can no longer be optimal.

use crate::utils::stats::median;

/// Segment cost model for the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentCost {
    /// Sum of absolute deviations from the segment median. Robust to
    /// outliers; the default for break detection on rate series.
    #[default]
    L1,
    /// Sum of squared deviations from the segment mean.
    L2,
    /// Gaussian likelihood cost `n * ln(variance)` for variance changes.
    Normal,
}

/// Configuration for the PELT search. The penalty is supplied per call,
/// matching the detector capability contract.
#[derive(Debug, Clone)]
pub struct PeltConfig {
    /// Segment cost model.
    pub cost: SegmentCost,
    /// Minimum admissible segment length.
    pub min_segment_length: usize,
}

impl Default for PeltConfig {
    fn default() -> Self {
        Self {
            cost: SegmentCost::L1,
            min_segment_length: 2,
        }
    }
}

impl PeltConfig {
    /// Set the cost model.
    pub fn cost(mut self, cost: SegmentCost) -> Self {
        self.cost = cost;
        self
    }

    /// Set the minimum segment length (at least 1).
    pub fn min_segment_length(mut self, len: usize) -> Self {
        self.min_segment_length = len.max(1);
        self
    }
}

/// Result of a PELT partition.
#[derive(Debug, Clone)]
pub struct PeltPartition {
    /// Interior changepoint indices, strictly increasing. Each index is
    /// the first observation of a new segment.
    pub changepoints: Vec<usize>,
    /// Segment boundaries as half-open `(start, end)` pairs covering the
    /// whole series.
    pub segments: Vec<(usize, usize)>,
    /// Total segment cost, excluding penalties.
    pub cost: f64,
}

/// Precomputed sums for O(1) L2/Normal segment costs; L1 falls back to a
/// direct median computation on the segment.
struct CostEvaluator<'a> {
    values: &'a [f64],
    cost: SegmentCost,
    cum_sum: Vec<f64>,
    cum_sum_sq: Vec<f64>,
}

impl<'a> CostEvaluator<'a> {
    fn new(values: &'a [f64], cost: SegmentCost) -> Self {
        let mut cum_sum = Vec::with_capacity(values.len() + 1);
        let mut cum_sum_sq = Vec::with_capacity(values.len() + 1);
        let mut running = 0.0;
        let mut running_sq = 0.0;
        cum_sum.push(0.0);
        cum_sum_sq.push(0.0);
        for &x in values {
            running += x;
            running_sq += x * x;
            cum_sum.push(running);
            cum_sum_sq.push(running_sq);
        }
        Self {
            values,
            cost,
            cum_sum,
            cum_sum_sq,
        }
    }

    fn segment(&self, start: usize, end: usize) -> f64 {
        let n = end - start;
        if n == 0 {
            return 0.0;
        }
        match self.cost {
            SegmentCost::L1 => {
                let segment = &self.values[start..end];
                let med = median(segment);
                segment.iter().map(|x| (x - med).abs()).sum()
            }
            SegmentCost::L2 => {
                let sum = self.cum_sum[end] - self.cum_sum[start];
                let sum_sq = self.cum_sum_sq[end] - self.cum_sum_sq[start];
                let mean = sum / n as f64;
                (sum_sq - n as f64 * mean * mean).max(0.0)
            }
            SegmentCost::Normal => {
                if n < 2 {
                    return 0.0;
                }
                let sum = self.cum_sum[end] - self.cum_sum[start];
                let sum_sq = self.cum_sum_sq[end] - self.cum_sum_sq[start];
                let mean = sum / n as f64;
                let var = (sum_sq - n as f64 * mean * mean).max(0.0) / n as f64;
                if var > 1e-10 {
                    n as f64 * var.ln()
                } else {
                    0.0
                }
            }
        }
    }
}

/// Partition a series into segments with the PELT algorithm.
///
/// Higher penalties yield fewer changepoints.
pub fn pelt_partition(values: &[f64], penalty: f64, config: &PeltConfig) -> PeltPartition {
    let n = values.len();
    let min_len = config.min_segment_length;
    let evaluator = CostEvaluator::new(values, config.cost);

    if n < 2 * min_len {
        return PeltPartition {
            changepoints: Vec::new(),
            segments: vec![(0, n)],
            cost: evaluator.segment(0, n),
        };
    }

    // best[t] = minimal penalized cost of segmenting values[0..t];
    // last_split[t] = optimal final split point for that prefix.
    let mut best = vec![f64::INFINITY; n + 1];
    best[0] = -penalty;
    let mut last_split = vec![0usize; n + 1];
    let mut candidates: Vec<usize> = vec![0];

    for t in min_len..=n {
        let mut best_cost = f64::INFINITY;
        let mut best_s = 0;
        for &s in &candidates {
            if t - s < min_len {
                continue;
            }
            let total = best[s] + evaluator.segment(s, t) + penalty;
            if total < best_cost {
                best_cost = total;
                best_s = s;
            }
        }
        best[t] = best_cost;
        last_split[t] = best_s;

        // Prune candidates that can never beat the current optimum.
        candidates.retain(|&s| {
            t - s < min_len || best[s] + evaluator.segment(s, t) <= best[t]
        });
        candidates.push(t);
    }

    // Backtrack the optimal splits.
    let mut changepoints = Vec::new();
    let mut t = n;
    while t > 0 {
        let prev = last_split[t];
        if prev > 0 {
            changepoints.push(prev);
        }
        t = prev;
    }
    changepoints.reverse();

    let mut segments = Vec::with_capacity(changepoints.len() + 1);
    let mut start = 0;
    for &cp in &changepoints {
        segments.push((start, cp));
        start = cp;
    }
    segments.push((start, n));

    let cost = segments
        .iter()
        .map(|&(s, e)| evaluator.segment(s, e))
        .sum();

    PeltPartition {
        changepoints,
        segments,
        cost,
    }
}
