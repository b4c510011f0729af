//! Upload protocol value objects.

pub mod binding;

pub use binding::UploadBinding;
