//! # stl_inspect
//!
//! Inspect an STL model: physical properties, a voxel scan animation and a
//! text report, bundled into one zip per model.

pub mod animation;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod geo;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod preview;
pub mod report;
pub mod stl;
pub mod voxel;
