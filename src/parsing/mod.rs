/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/

/// Truth classifier for benchmarking-comparison files
pub mod happy;
/// Streaming record parser for metrics files
pub mod query;
/// Metric-schema discovery from header metadata
pub mod schema;
/// Shared call-file opening and line splitting helpers
pub mod vcf_reader;
