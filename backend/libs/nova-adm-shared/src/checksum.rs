//! Canonical payload checksum sent in the `md5` field.
//!
//! ADM recomputes the same value on its side, so the exact byte layout
//! matters: keys ordered by their UTF-8 bytes, `key:value` pairs joined
//! with `,`, MD5 digest, standard base64 with padding.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Calculate the base64 MD5 checksum of a data map
pub fn calculate_md5_checksum(data: &HashMap<String, String>) -> String {
    let mut entries: Vec<(&String, &String)> = data.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    let canonical = entries
        .iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join(",");

    let digest = md5::compute(canonical.as_bytes());
    STANDARD.encode(digest.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_checksum_known_value() {
        let data = map(&[("title", "Hi"), ("body", "hello")]);

        // md5("body:hello,title:Hi")
        assert_eq!(calculate_md5_checksum(&data), "t6A+zg+uF5BUPcZsYNS69w==");
    }

    #[test]
    fn test_checksum_single_entry() {
        let data = map(&[("message", "Hi")]);
        assert_eq!(calculate_md5_checksum(&data), "0Yg4fqC9YeOxlfhaSdFNQA==");
    }

    #[test]
    fn test_checksum_is_order_independent() {
        let mut forward = HashMap::new();
        forward.insert("alpha".to_string(), "1".to_string());
        forward.insert("beta".to_string(), "2".to_string());
        forward.insert("Zeta".to_string(), "3".to_string());

        let mut reverse = HashMap::new();
        reverse.insert("Zeta".to_string(), "3".to_string());
        reverse.insert("beta".to_string(), "2".to_string());
        reverse.insert("alpha".to_string(), "1".to_string());

        // Uppercase sorts before lowercase in byte order
        assert_eq!(calculate_md5_checksum(&forward), "KJx35Wwdh23JTITe1IIjFA==");
        assert_eq!(
            calculate_md5_checksum(&forward),
            calculate_md5_checksum(&reverse)
        );
    }

    #[test]
    fn test_checksum_sorts_multibyte_keys_by_bytes() {
        let data = map(&[("café", "crème"), ("cafe", "plain")]);

        // md5("cafe:plain,café:crème")
        assert_eq!(calculate_md5_checksum(&data), "5J0lbFNlBbUYba+xBrvLBg==");
    }

    #[test]
    fn test_checksum_empty_map() {
        let data = HashMap::new();

        // md5("")
        assert_eq!(calculate_md5_checksum(&data), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }
}
