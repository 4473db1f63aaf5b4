/*!
# CLI module
Command line interface functionality that is specific to qcdist.
*/

/// The main CLI module that contains the top-level parser and file checks
pub mod core;
/// The distribution-comparison settings, validation, and naming contract
pub mod dist;
