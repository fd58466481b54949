use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{BoxError, Serializer};

/// JSON via `serde_json`.
///
/// Each value is one self-contained JSON document; map keys must be strings,
/// so values such as `HashMap<(u8, u8), _>` fail to encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, BoxError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, BoxError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
