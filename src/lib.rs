
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Bucketing and percentile transforms for the plotted series
pub mod dist;
/// Core logic for joining classification and metric records
pub mod merge;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Batch orchestration of one comparison run
pub mod pipeline;
/// All output writers
pub mod writers;
