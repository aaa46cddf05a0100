//! Image hosting for listing photos.
//!
//! [`CloudinaryClient`] implements [`emlak_core::gateway::ImageHost`] with
//! signed uploads to the Cloudinary REST API.

pub mod cloudinary;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig};
