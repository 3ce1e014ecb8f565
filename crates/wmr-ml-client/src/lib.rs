//! Clients for the model servers used by the watermark pipeline.
//!
//! Two services are involved:
//! - an Ollama-style vision-language model answering free-text questions
//!   about a frame (`/api/generate`)
//! - an IOPaint-style inpainting server filling a masked area (`/inpaint`)
//!
//! Both sit behind traits ([`VisionModel`], [`InpaintModel`]) so the pipeline
//! can be driven by in-process fakes.

pub mod config;
pub mod error;
pub mod inpaint;
pub mod types;
pub mod vision;

pub use config::{DetectorConfig, InpainterConfig};
pub use error::{MlError, MlResult};
pub use inpaint::{InpaintClient, InpaintModel};
pub use vision::{VisionClient, VisionModel};
