//! Submitted form access.

pub mod multipart;

pub use multipart::{FormPart, FormParts, MultipartForm, MultipartItem};
