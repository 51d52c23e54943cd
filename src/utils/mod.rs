//! Utility modules

pub mod flatten;
pub mod validation;

pub use flatten::*;
pub use validation::*;
