mod encryption;
mod json_logging;
mod patch;
mod validation;

pub use encryption::*;
pub use json_logging::*;
pub use patch::*;
pub use validation::*;
