use serde::{de::DeserializeOwned, Serialize};

use crate::error::CodecError;

/// Deterministic value serialization used for records and key lists.
///
/// Implementations must round-trip every value they encode.
pub trait Codec {
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + ?Sized;

    fn decode<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned;
}

impl<C: Codec> Codec for &C {
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + ?Sized,
    {
        Codec::encode(*self, value)
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        Codec::decode(*self, bytes)
    }
}

/// Default codec backed by `bincode`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + ?Sized,
    {
        bincode::serialize(value).map_err(|err| CodecError::Encode(err))
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        bincode::deserialize(bytes).map_err(|err| CodecError::Decode(err))
    }
}
