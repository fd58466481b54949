use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{BoxError, Serializer};

/// MessagePack via `rmp-serde`.
///
/// Structs are written as maps keyed by field name (`to_vec_named`), so
/// peers decoding by name rather than position interoperate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgPackSerializer;

impl Serializer for MsgPackSerializer {
    fn name(&self) -> &'static str {
        "msgpack"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, BoxError> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, BoxError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn structs_are_maps() {
        let bytes = MsgPackSerializer.encode(&Point { x: 1, y: -1 }).unwrap();
        // fixmap with two entries
        assert_eq!(bytes[0], 0x82);
        assert_eq!(
            MsgPackSerializer.decode::<Point>(&bytes).unwrap(),
            Point { x: 1, y: -1 }
        );
    }

    #[test]
    fn malformed_bytes_fail_to_decode() {
        assert!(MsgPackSerializer.decode::<Point>(&[0xc1]).is_err());
    }

    #[test]
    fn empty_payload_fails_to_decode() {
        assert!(MsgPackSerializer.decode::<u8>(&[]).is_err());
    }
}
