//! Small numerical helpers shared across the workspace.

pub mod functions;
pub mod interpolate;
