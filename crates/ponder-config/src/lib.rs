//! Configuration model for ponder: pipeline templates loaded from JSON
//! files, model sampling defaults, and process-level runtime settings.

mod model;
mod settings;
mod template;

pub use model::ModelConfig;
pub use settings::{OUTPUT_DIR_ENV, Settings};
pub use template::{FieldKind, PhaseDef, Template};
