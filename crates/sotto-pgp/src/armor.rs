//! ASCII armor decoding for public-key blocks.
//!
//! Accepts the framing used for transferable public keys: BEGIN/END
//! lines, optional armor headers (`Version:` etc.), a base64 body, and
//! an optional `=XXXX` CRC-24 checksum line. Text before the BEGIN line
//! is ignored, so a block can be cut out of surrounding message text.

use base64::Engine as _;

use crate::KeyParseError;

const ARMOR_BEGIN: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----";
const ARMOR_END: &str = "-----END PGP PUBLIC KEY BLOCK-----";

/// Decode an armored public-key block into binary key material.
pub fn dearmor(block: &[u8]) -> Result<Vec<u8>, KeyParseError> {
    let text = std::str::from_utf8(block).map_err(|_| KeyParseError::NotArmored)?;

    let mut in_block = false;
    let mut in_headers = true;
    let mut terminated = false;
    let mut body = String::new();
    let mut checksum: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if !in_block {
            if line == ARMOR_BEGIN {
                in_block = true;
            }
            continue;
        }
        if line == ARMOR_END {
            terminated = true;
            break;
        }
        if in_headers {
            if line.is_empty() {
                in_headers = false;
                continue;
            }
            // Armor headers are "Key: value" lines; ':' never appears in
            // the base64 alphabet, so this cannot eat body lines.
            if line.contains(':') {
                continue;
            }
            // Tolerate a missing blank separator line.
            in_headers = false;
        }
        if let Some(sum) = line.strip_prefix('=') {
            checksum = Some(sum.to_string());
            continue;
        }
        body.push_str(line);
    }

    if !in_block || !terminated {
        return Err(KeyParseError::NotArmored);
    }

    let material = base64::engine::general_purpose::STANDARD
        .decode(body.as_bytes())
        .map_err(|e| KeyParseError::InvalidBase64(e.to_string()))?;
    if material.is_empty() {
        return Err(KeyParseError::Truncated);
    }

    if let Some(sum) = checksum {
        let declared = base64::engine::general_purpose::STANDARD
            .decode(sum.as_bytes())
            .map_err(|e| KeyParseError::InvalidBase64(e.to_string()))?;
        let computed = crc24(&material).to_be_bytes();
        if declared.len() != 3 || declared[..] != computed[1..] {
            return Err(KeyParseError::ChecksumMismatch);
        }
    }

    Ok(material)
}

/// CRC-24 over the decoded armor body (OpenPGP polynomial 0x1864CFB,
/// init 0xB704CE).
pub fn crc24(data: &[u8]) -> u32 {
    let mut crc: u32 = 0x00B7_04CE;
    for byte in data {
        crc ^= u32::from(*byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= 0x0186_4CFB;
            }
        }
    }
    crc & 0x00FF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkeys;

    #[test]
    fn test_dearmor_fixture() {
        let material = dearmor(testkeys::MACTOWER_PUBLIC_KEY.as_bytes()).expect("dearmor");
        assert!(!material.is_empty());
        // First byte is an old-format packet header with the tag bit set.
        assert_eq!(material[0] & 0x80, 0x80);
    }

    #[test]
    fn test_dearmor_ignores_surrounding_text() {
        let wrapped = format!(
            "Forwarded key follows.\n\n{}\nregards",
            testkeys::SOTTO_FIXTURE_PUBLIC_KEY
        );
        let material = dearmor(wrapped.as_bytes()).expect("dearmor");
        assert!(!material.is_empty());
    }

    #[test]
    fn test_dearmor_missing_end_line() {
        let truncated = testkeys::MACTOWER_PUBLIC_KEY
            .split("-----END")
            .next()
            .expect("split");
        assert!(matches!(
            dearmor(truncated.as_bytes()),
            Err(KeyParseError::NotArmored)
        ));
    }

    #[test]
    fn test_dearmor_corrupted_base64() {
        let corrupted = testkeys::MACTOWER_PUBLIC_KEY.replacen("mQENBF", "!!!!!!", 1);
        assert!(matches!(
            dearmor(corrupted.as_bytes()),
            Err(KeyParseError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_dearmor_checksum_mismatch() {
        let tampered = testkeys::MACTOWER_PUBLIC_KEY.replacen("=IF8v", "=AAAA", 1);
        assert!(matches!(
            dearmor(tampered.as_bytes()),
            Err(KeyParseError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_dearmor_not_utf8() {
        assert!(matches!(
            dearmor(&[0xFF, 0xFE, 0x00, 0x80]),
            Err(KeyParseError::NotArmored)
        ));
    }

    #[test]
    fn test_crc24_known_vector() {
        // Empty input leaves the initializer masked to 24 bits.
        assert_eq!(crc24(b""), 0x00B7_04CE);
        assert_ne!(crc24(b"a"), crc24(b"b"));
    }
}
