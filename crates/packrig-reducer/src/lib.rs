//! # packrig-reducer
//!
//! The extension mechanism behind every packrig configuration producer.
//!
//! A [`ReducerPipeline`] maps extension-point names to ordered lists of
//! handlers. Producers pass each partial configuration through one or more
//! points before returning it, so extension code can observe, augment or
//! replace any generated value without the producer exposing its own hooks.
//!
//! ```
//! use packrig_reducer::ReducerPipeline;
//!
//! let pipeline = ReducerPipeline::builder()
//!     .on("greeting", |value: String, suffix: &String| Ok(format!("{value}{suffix}")))
//!     .build();
//!
//! let out = pipeline
//!     .reduce(&["greeting-for-node", "greeting"], "hello".to_string(), &"!".to_string())
//!     .unwrap();
//! assert_eq!(out, "hello!");
//! ```

mod error;
mod names;
mod pipeline;

pub use error::{ReduceError, Result};
pub use names::Names;
pub use pipeline::{ReducerPipeline, ReducerPipelineBuilder};
