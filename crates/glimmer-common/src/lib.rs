//! Common utilities for the Glimmer decoders.
//!
//! This crate provides shared infrastructure used by every format crate:
//! - **Byte Reader** - bounds-checked integer extraction over untrusted input
//! - **Decoded Image** - the packed ARGB32 pixel buffer handed to callers
//! - **Errors** - the format/unsupported error split shared by all decoders
//! - **Options** - decoder strictness and resource limits
//! - **Warning System** - colored terminal output for ignored features

pub mod bytes;
pub mod error;
pub mod image;
pub mod options;
pub mod warning;

pub use error::{DecodeError, ErrorKind, ImageFormat};
pub use image::{DecodedImage, pack_argb, unpack_argb};
pub use options::DecodeOptions;
