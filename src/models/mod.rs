//! Response models

pub mod health;
pub mod model_info;
pub mod prediction;

pub use health::*;
pub use model_info::*;
pub use prediction::*;

use serde::Serializer;

/// Serialize (key, value) pairs as a JSON object, keeping their order.
pub(crate) fn ordered_pairs<S: Serializer>(
    pairs: &Option<Vec<(String, f64)>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match pairs {
        Some(pairs) => serializer.collect_map(pairs.iter().map(|(k, v)| (k, v))),
        None => serializer.serialize_none(),
    }
}
