//! VAT - Video Annotation Tool
//!
//! A frame-indexed annotation core for driving video segmentation: pointer
//! gestures become normalized box and point prompts, frame payloads are
//! cached with predictive prefetch, and optimistic local drafts are
//! reconciled against a remote store through cache invalidation on
//! acknowledged writes.

pub mod app;
pub mod cache;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod message;
pub mod model;
pub mod navigator;
pub mod remote;
pub mod runtime;
pub mod scene;
pub mod sync;

pub use app::AnnotatorApp;
pub use cache::{FrameCache, FrameKey};
pub use config::AppConfig;
pub use editor::{AnnotationChanged, AnnotationEditor, DrawMode};
pub use error::AnnotatorError;
pub use geometry::{BoundingBox, Point};
pub use message::{Effect, Message};
pub use model::{Annotation, DraftAnnotations, FramePayload};
pub use navigator::FrameNavigator;
pub use remote::{FrameStore, MemoryStore, VideoListing};
pub use runtime::SessionRuntime;
pub use scene::{Background, DrawCommand, FrameScene, Scene};
pub use sync::SyncController;
