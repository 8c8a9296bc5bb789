//! Minimal OpenPGP packet grammar for identity extraction.
//!
//! Walks the packet sequence of a transferable public key and extracts
//! exactly what the trust decision needs: the primary key's fingerprint,
//! algorithm and creation time, the first user id, and the key
//! expiration declared in the first self-certification signature.
//! Subkeys and everything else are skipped, not rejected.

use sha1::{Digest, Sha1};
use sotto_types::identity::{IdentityRecord, KeyAlgorithm};

use crate::KeyParseError;

const TAG_SIGNATURE: u8 = 2;
const TAG_PUBLIC_KEY: u8 = 6;
const TAG_USER_ID: u8 = 13;

/// Bounds-checked reader over binary key material.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], KeyParseError> {
        let end = self.pos.checked_add(len).ok_or(KeyParseError::Truncated)?;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(KeyParseError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, KeyParseError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, KeyParseError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, KeyParseError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Extract an identity record from dearmored key material.
///
/// The first packet must be the primary public-key packet; a block
/// without one has no fingerprint and therefore no identity.
pub fn parse_identity(material: &[u8]) -> Result<IdentityRecord, KeyParseError> {
    let mut reader = Reader::new(material);
    let mut record: Option<IdentityRecord> = None;
    let mut saw_user_id = false;

    while !reader.is_empty() {
        let (tag, body) = next_packet(&mut reader)?;
        if record.is_none() && tag != TAG_PUBLIC_KEY {
            return Err(KeyParseError::PacketGrammar(
                "block does not start with a public key packet",
            ));
        }
        match tag {
            TAG_PUBLIC_KEY if record.is_none() => {
                record = Some(parse_public_key(body)?);
            }
            TAG_USER_ID if !saw_user_id => {
                if let Some(rec) = record.as_mut() {
                    saw_user_id = true;
                    rec.user_id = String::from_utf8_lossy(body).into_owned();
                }
            }
            TAG_SIGNATURE if saw_user_id => {
                if let Some(rec) = record.as_mut() {
                    if rec.expires_at.is_none() {
                        if let Some(secs) = certification_key_expiration(body) {
                            rec.expires_at = Some(rec.created_at.saturating_add(u64::from(secs)));
                        }
                    }
                }
            }
            _ => {} // subkeys, trust packets, subkey signatures
        }
    }

    record.ok_or(KeyParseError::MissingPublicKey)
}

/// Decode one packet header (old or new format) and return its body.
fn next_packet<'a>(reader: &mut Reader<'a>) -> Result<(u8, &'a [u8]), KeyParseError> {
    let header = reader.read_u8()?;
    if header & 0x80 == 0 {
        return Err(KeyParseError::PacketGrammar("packet tag bit not set"));
    }

    let (tag, len) = if header & 0x40 != 0 {
        // New format: tag in the low six bits, variable-width length.
        let tag = header & 0x3F;
        let first = usize::from(reader.read_u8()?);
        let len = match first {
            0..=191 => first,
            192..=223 => (first - 192) * 256 + usize::from(reader.read_u8()?) + 192,
            255 => reader.read_u32()? as usize,
            _ => {
                return Err(KeyParseError::PacketGrammar(
                    "partial body lengths are not supported",
                ))
            }
        };
        (tag, len)
    } else {
        // Old format: tag in bits 2-5, length type in the low two bits.
        let tag = (header >> 2) & 0x0F;
        let len = match header & 0x03 {
            0 => usize::from(reader.read_u8()?),
            1 => usize::from(reader.read_u16()?),
            2 => reader.read_u32()? as usize,
            _ => {
                return Err(KeyParseError::PacketGrammar(
                    "indeterminate packet length",
                ))
            }
        };
        (tag, len)
    };

    Ok((tag, reader.take(len)?))
}

/// Parse a version-4 public-key packet body into a partial record
/// (user id and expiry are filled in from later packets).
fn parse_public_key(body: &[u8]) -> Result<IdentityRecord, KeyParseError> {
    let mut reader = Reader::new(body);
    let version = reader.read_u8()?;
    if version != 4 {
        return Err(KeyParseError::UnsupportedKeyVersion(version));
    }
    let created_at = u64::from(reader.read_u32()?);
    let algorithm = KeyAlgorithm::from_id(reader.read_u8()?);

    Ok(IdentityRecord {
        fingerprint: v4_fingerprint(body)?,
        user_id: String::new(),
        algorithm,
        created_at,
        expires_at: None,
    })
}

/// The v4 fingerprint: SHA-1 over `0x99 || two-octet length || body`,
/// rendered as uppercase hex.
fn v4_fingerprint(body: &[u8]) -> Result<String, KeyParseError> {
    let len = u16::try_from(body.len())
        .map_err(|_| KeyParseError::PacketGrammar("oversized public key packet"))?;
    let mut hasher = Sha1::new();
    hasher.update([0x99]);
    hasher.update(len.to_be_bytes());
    hasher.update(body);
    Ok(hex::encode(hasher.finalize()).to_ascii_uppercase())
}

/// Pull the key-expiration subpacket (type 9) out of the hashed area of
/// a v4 certification signature. Returns seconds after key creation.
///
/// Anything that does not look like a positive certification is ignored
/// rather than treated as an error: missing expiry just means the key
/// does not expire.
fn certification_key_expiration(body: &[u8]) -> Option<u32> {
    let mut reader = Reader::new(body);
    if reader.read_u8().ok()? != 4 {
        return None;
    }
    let sig_type = reader.read_u8().ok()?;
    if !(0x10..=0x13).contains(&sig_type) {
        return None;
    }
    reader.take(2).ok()?; // public-key and hash algorithm ids
    let hashed_len = usize::from(reader.read_u16().ok()?);
    let mut sub = Reader::new(reader.take(hashed_len).ok()?);

    while !sub.is_empty() {
        let first = usize::from(sub.read_u8().ok()?);
        let len = match first {
            0..=191 => first,
            192..=254 => (first - 192) * 256 + usize::from(sub.read_u8().ok()?) + 192,
            _ => sub.read_u32().ok()? as usize,
        };
        if len == 0 {
            return None;
        }
        let subpacket = sub.take(len).ok()?;
        let sp_type = subpacket.first()? & 0x7F; // strip the critical bit
        if sp_type == 9 {
            let secs = subpacket.get(1..5)?;
            return Some(u32::from_be_bytes([secs[0], secs[1], secs[2], secs[3]]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armor::dearmor;
    use crate::testkeys;
    use sotto_types::identity::KeyAlgorithm;

    fn fixture_material() -> Vec<u8> {
        dearmor(testkeys::MACTOWER_PUBLIC_KEY.as_bytes()).expect("dearmor fixture")
    }

    #[test]
    fn test_parse_identity_golden() {
        let record = parse_identity(&fixture_material()).expect("parse");
        assert_eq!(record.fingerprint, testkeys::MACTOWER_FINGERPRINT);
        assert_eq!(record.user_id, testkeys::MACTOWER_USER_ID);
        assert_eq!(record.algorithm, KeyAlgorithm::Rsa);
        assert_eq!(record.created_at, testkeys::MACTOWER_CREATED_AT);
        assert_eq!(record.expires_at, Some(testkeys::MACTOWER_EXPIRES_AT));
    }

    #[test]
    fn test_parse_identity_no_expiry() {
        let material =
            dearmor(testkeys::SOTTO_FIXTURE_PUBLIC_KEY.as_bytes()).expect("dearmor fixture");
        let record = parse_identity(&material).expect("parse");
        assert_eq!(record.fingerprint, testkeys::SOTTO_FIXTURE_FINGERPRINT);
        assert_eq!(record.user_id, testkeys::SOTTO_FIXTURE_USER_ID);
        assert_eq!(record.expires_at, None);
    }

    #[test]
    fn test_parse_identity_deterministic() {
        let material = fixture_material();
        let a = parse_identity(&material).expect("parse");
        let b = parse_identity(&material).expect("parse");
        assert_eq!(a, b);
    }

    #[test]
    fn test_truncated_material() {
        let material = fixture_material();
        for cut in [1usize, 3, 7, 50, material.len() - 1] {
            let result = parse_identity(&material[..cut]);
            assert!(result.is_err(), "cut at {} should fail", cut);
        }
    }

    #[test]
    fn test_empty_material() {
        assert!(matches!(
            parse_identity(&[]),
            Err(KeyParseError::MissingPublicKey)
        ));
    }

    #[test]
    fn test_first_packet_must_be_public_key() {
        // A lone user-id packet (old format, tag 13, one-octet length).
        let material = [0xB4, 0x04, b't', b'e', b's', b't'];
        assert!(matches!(
            parse_identity(&material),
            Err(KeyParseError::PacketGrammar(_))
        ));
    }

    #[test]
    fn test_unsupported_key_version() {
        // Old-format public key packet claiming version 3.
        let body = [3u8, 0, 0, 0, 0, 1];
        let mut material = vec![0x98, body.len() as u8];
        material.extend_from_slice(&body);
        assert!(matches!(
            parse_identity(&material),
            Err(KeyParseError::UnsupportedKeyVersion(3))
        ));
    }

    #[test]
    fn test_key_id_from_fingerprint() {
        let record = parse_identity(&fixture_material()).expect("parse");
        assert_eq!(record.key_id(), "55A45A99FE45E540");
    }
}
