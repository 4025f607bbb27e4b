//! JSON decoding into caller-chosen models

use crate::error::CryptoApiError;
use serde::de::DeserializeOwned;

/// Decodes validated bytes into a model type
pub trait PayloadDecoder: Send + Sync + 'static {
    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, serde_json::Error>;
}

/// Default decoder backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl PayloadDecoder for JsonDecoder {
    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

/// Runs a decoder and classifies its failure
pub fn decode_with<D: PayloadDecoder, T: DeserializeOwned>(
    decoder: &D,
    payload: &[u8],
) -> Result<T, CryptoApiError> {
    decoder.decode(payload).map_err(CryptoApiError::DecodingError)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKindTag;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Quote {
        symbol: String,
        price: f64,
    }

    #[test]
    fn test_decodes_into_requested_type() {
        let quote: Quote =
            decode_with(&JsonDecoder, br#"{"symbol":"BTC-USD","price":50000.5}"#).unwrap();
        assert_eq!(
            quote,
            Quote {
                symbol: "BTC-USD".into(),
                price: 50000.5
            }
        );
    }

    #[test]
    fn test_schema_mismatch_is_decoding_error() {
        let err = decode_with::<_, Quote>(&JsonDecoder, br#"{"symbol":1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKindTag::Decoding);
    }

    #[test]
    fn test_empty_body_is_decoding_error() {
        let err = decode_with::<_, Quote>(&JsonDecoder, b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKindTag::Decoding);
    }
}
