pub mod error;
pub mod merge;
pub mod overrides;
pub mod params;
pub mod settings;
pub mod target;
pub mod validation;

mod helpers;

// Re-export main types
pub use error::*;
pub use params::*;
pub use settings::*;
pub use target::*;

pub use merge::{apply_merge_patch, merge_configs, MergePolicy};
pub use overrides::OverrideFile;
pub use validation::Validate;
