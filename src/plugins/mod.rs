//! Standard comparison plugins

pub mod composite;
pub mod floating;
pub mod numeric;
pub mod scalar;
pub mod temporal;

pub use composite::*;
pub use floating::*;
pub use numeric::*;
pub use scalar::*;
pub use temporal::*;

use crate::traits::ComparisonPlugin;
use crate::types::Value;

/// The default plugin chain, in dispatch order
pub fn standard_plugins() -> Vec<Box<dyn ComparisonPlugin>> {
    vec![
        Box::new(StringPlugin::default()),
        Box::new(BoolPlugin),
        Box::new(SignedIntegerPlugin::default()),
        Box::new(UnsignedIntegerPlugin::default()),
        Box::new(IntegerPlugin::default()),
        Box::new(BigIntPlugin::default()),
        Box::new(F64Plugin::default()),
        Box::new(F32Plugin::default()),
        Box::new(DecimalPlugin::default()),
        Box::new(DateTimePlugin::default()),
        Box::new(DurationPlugin),
        Box::new(GuidPlugin),
        Box::new(EnumPlugin),
    ]
}

/// Extract one side of a comparison.
///
/// Returns `None` when a value is present but of a type the plugin does not
/// handle, `Some(None)` for a missing value.
pub(crate) fn extract_side<'a, T>(
    value: Option<&'a Value>,
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Option<Option<T>> {
    match value {
        Some(value) => extract(value).map(Some),
        None => Some(None),
    }
}
