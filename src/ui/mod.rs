//! Terminal output

mod progress;
pub mod style;

pub use progress::ProgressReporter;
