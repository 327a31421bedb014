//! Core decision logic

pub mod rotation;

pub use rotation::RotationPolicy;
