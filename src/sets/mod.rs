//! Reconciliation of object collections

mod bucket;
pub mod key;
pub mod reconciler;
pub mod result;

pub use key::*;
pub use reconciler::*;
pub use result::*;
