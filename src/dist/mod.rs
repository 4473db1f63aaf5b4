/*!
# Distribution module
Turns the merged record collection into the numeric series that get plotted.
*/

/// Categorical bucketing of merged records into per-group series
pub mod bucket;
/// Empirical percentile-rank transform for hover metadata
pub mod percentile;
