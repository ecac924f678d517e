//! oxstitch-export: Open Cross Stitch chart serializer.
//!
//! Converts a [`CodedImage`](oxstitch_pattern::CodedImage) and an
//! ordered palette into an `.oxs` XML document. [`oxs`] streams into
//! any [`std::io::Write`] sink or renders to a `String`; [`file`] adds
//! path-based entry points with scoped, flushed file handles.

pub mod file;
pub mod oxs;

pub use file::{ExportError, export_to_file, export_to_file_atomic};
pub use oxs::{to_oxs, write_oxs};
