//! Command-line access to the Bugninja CMS reads, mainly for checking what
//! the content layer sees without running the server.

/// Argument definitions.
pub mod cli;
/// Command execution.
pub mod commands;
