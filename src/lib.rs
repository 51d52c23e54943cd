//! # Reconcile Core
//!
//! A value reconciliation library: compares an expected and an actual set of
//! flattened values (or whole collections of objects) and reports per-key
//! differences.
//!
//! ## Features
//!
//! - **Value reconciliation**: key-by-key comparison driven by an ordered chain of comparison plugins
//! - **Configurable policies**: handling of unmatched keys and unclaimed values, loadable from TOML
//! - **Standard plugins**: integers, floating point and decimals with tolerances, strings, dates, durations, GUIDs and enums
//! - **Set reconciliation**: bucketing of object collections by composite key into matching, differing, missing, additional and incomparable
//! - **Flattening**: a `serde_json` backed flattener for any `Serialize` type
//!
//! ## Quick Start
//!
//! ```rust
//! use reconcile_core::{ReconcilerConfig, ValueReconciler, Value};
//!
//! let reconciler = ValueReconciler::with_standard_plugins(ReconcilerConfig::default());
//!
//! let expected = vec![("price", Some(Value::F64(10.0))), ("qty", Some(Value::I32(3)))];
//! let actual = vec![("price", Some(Value::F64(10.5))), ("qty", Some(Value::I32(3)))];
//!
//! let differences = reconciler.reconcile(expected, actual).unwrap();
//! assert_eq!(differences.len(), 1);
//! assert_eq!(differences.get("price").unwrap().payload, Some(Value::F64(0.5)));
//! ```

pub mod plugins;
pub mod reconciler;
pub mod sets;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use plugins::standard_plugins;
pub use reconciler::*;
pub use sets::*;
pub use traits::*;
pub use types::*;
pub use utils::flatten::JsonFlattener;
