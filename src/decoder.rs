use std::io::Read;

use flate2::read::GzDecoder;
use log::debug;
use serde_json::Value;

use crate::error::ImportError;
use crate::model::{PaprikaRecipe, RawRecipe};

/// Decompress and parse one `.paprikarecipe` blob.
///
/// At most `max_bytes` of decompressed JSON are accepted; anything larger is rejected
/// as a decode failure rather than read into memory.
pub fn decode(raw: &RawRecipe, max_bytes: u64) -> Result<PaprikaRecipe, ImportError> {
    let mut json = Vec::new();
    GzDecoder::new(raw.bytes.as_slice())
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut json)
        .map_err(|e| ImportError::decode(&raw.origin, format!("invalid gzip data: {e}")))?;

    if json.len() as u64 > max_bytes {
        return Err(ImportError::decode(
            &raw.origin,
            format!("decompressed recipe exceeds {max_bytes} bytes"),
        ));
    }
    debug!("{}: {} bytes of JSON", raw.origin, json.len());

    let value: Value = serde_json::from_slice(&json)
        .map_err(|e| ImportError::decode(&raw.origin, format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(ImportError::decode(
            &raw.origin,
            "recipe document is not a JSON object",
        ));
    }

    serde_json::from_value(value).map_err(|e| ImportError::decode(&raw.origin, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn raw(bytes: Vec<u8>) -> RawRecipe {
        RawRecipe {
            origin: "Soup.paprikarecipe".to_string(),
            bytes,
        }
    }

    #[test]
    fn test_decode_success() {
        let bytes = gzip(br#"{"name": "Soup", "ingredients": "Water\nSalt"}"#);
        let recipe = decode(&raw(bytes), 1024).unwrap();

        assert_eq!(recipe.name.as_deref(), Some("Soup"));
        assert_eq!(recipe.ingredients.map(|i| i.len()), Some(2));
    }

    #[test]
    fn test_plain_json_is_not_gzip() {
        let err = decode(&raw(br#"{"name": "Soup"}"#.to_vec()), 1024).unwrap_err();
        assert!(matches!(err, ImportError::DecodeError { .. }));
        assert!(err.to_string().contains("Soup.paprikarecipe"));
    }

    #[test]
    fn test_truncated_gzip() {
        let mut bytes = gzip(br#"{"name": "Soup"}"#);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            decode(&raw(bytes), 1024),
            Err(ImportError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        let err = decode(&raw(gzip(b"{not json")), 1024).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = decode(&raw(gzip(b"[1, 2, 3]")), 1024).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_size_limit() {
        let big = format!(r#"{{"name": "Soup", "notes": "{}"}}"#, "a".repeat(4096));
        let err = decode(&raw(gzip(big.as_bytes())), 1024).unwrap_err();
        assert!(err.to_string().contains("exceeds 1024 bytes"));
    }
}
