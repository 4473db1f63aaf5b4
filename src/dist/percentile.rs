
use itertools::Itertools;

/// Computes the empirical percentile rank of each value: the percentage of
/// sequence values <= that value, with average-rank handling for ties,
/// rounded to two decimals. Output order matches input order. Sort-based,
/// O(N log N). Purely decorative hover metadata; it never affects binning.
/// # Arguments
/// * `values` - the series to rank
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let order: Vec<usize> = (0..n)
        .sorted_by(|&a, &b| values[a].total_cmp(&values[b]))
        .collect();

    let mut ranks = vec![0.0; n];
    let mut run_start = 0;
    while run_start < n {
        // find the end of the tie run
        let mut run_end = run_start;
        while run_end + 1 < n && values[order[run_end + 1]] == values[order[run_start]] {
            run_end += 1;
        }

        // 1-based ranks run_start+1 ..= run_end+1, averaged across the tie
        let average_rank = (run_start + run_end + 2) as f64 / 2.0;
        let percentile = round2(average_rank / n as f64 * 100.0);
        for &original_index in &order[run_start..=run_end] {
            ranks[original_index] = percentile;
        }
        run_start = run_end + 1;
    }

    ranks
}

/// Rounds to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
