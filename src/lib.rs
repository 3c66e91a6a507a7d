//! Detection of local file and folder links in terminal output.
//!
//! [`link::LocalLinkDetector`] scans a wrapped terminal line for path-like
//! text, validates each candidate through a [`link::PathResolver`], and
//! returns links positioned in buffer coordinates.

pub mod config;
pub mod link;
pub mod workspace;
