//! Value reconciler and its policy configuration

pub mod engine;
pub mod policy;

pub use engine::*;
pub use policy::*;
