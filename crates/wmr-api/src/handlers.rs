//! Request handlers.

pub mod frames;
pub mod health;
pub mod upload;
pub mod videos;
pub mod watermark;

pub use frames::*;
pub use health::*;
pub use videos::*;
pub use watermark::*;
