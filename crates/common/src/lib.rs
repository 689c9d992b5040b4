//! Build metadata shared across the workspace.

pub mod build_info;

pub use build_info::BuildInfo;
