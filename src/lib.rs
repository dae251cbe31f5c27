//! Decoder for `.SKIN` multi-submesh 3D model container files.
//!
//! The file is the interface: [`skin::decode`] turns an in-memory byte
//! buffer into a validated [`skin::SkinModel`] in one linear pass, or fails
//! with a single [`error::DecodeError`]. Scene construction, material
//! graphs and texture loading are left to consumers of the model.

/// Bounds-checked sequential byte reader
pub mod cursor;
/// Error definitions
pub mod error;
/// The `.SKIN` data model and record decoders
pub mod skin;

pub use error::{DecodeError, Violation};
pub use skin::{FileHeader, Material, SkinModel, Submesh, decode};
