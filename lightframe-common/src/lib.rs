//! Shared utilities for the lightframe demo framework
//!
//! This crate provides the pieces the demos share on top of the codecs:
//!
//! - [`packing`] - numeric packing (f32 ↔ f16 half floats, 10-10-10-2
//!   vertex attribute words)
//! - [`texture`] - mapping decoded images to GPU-upload format pairs

pub mod packing;
pub mod texture;

// Re-export commonly used packing items
pub use packing::{
    f16_to_f32, f32_to_f16, pack_snorm_10_10_10_2, pack_snorm_10_10_10_2_v,
    pack_unorm_10_10_10_2, pack_unorm_10_10_10_2_v,
};

// Re-export the upload mapping
pub use texture::{ExternalFormat, InternalFormat, UploadDesc, mip_level_count, texture_formats};
