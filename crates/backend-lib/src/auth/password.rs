// ============================
// portal-auth/src/auth/password.rs
// ============================
//! Legacy portable password hashes (`$P$` / `$H$`).
//!
//! These are the iterated, salted MD5 hashes the partner CMS stores for its
//! users. A stored hash is self-describing:
//!
//! ```text
//! $P$ B Jn2c8DCx z66LJR/5jOAXL6WPVlqJ9/
//! tag | salt     encoded digest (22 chars)
//!     iteration exponent
//! ```
//!
//! Verification recomputes the hash from the 12-byte prefix and compares it
//! to the stored string. Anything malformed fails closed.
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Alphabet used both for the iteration exponent and the digest encoding.
pub const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Smallest accepted iteration exponent (2^7 rounds)
pub const MIN_COUNT_LOG2: u32 = 7;

/// Largest accepted iteration exponent (2^30 rounds)
pub const MAX_COUNT_LOG2: u32 = 30;

/// Hasher strength the partner platform is configured with.
/// The effective exponent written into new settings is `strength + 5`.
pub const DEFAULT_STRENGTH: u32 = 8;

/// Length of tag + exponent + salt
const SETTING_LEN: usize = 12;
const SALT_LEN: usize = 8;
const TAGS: [&[u8; 3]; 2] = [b"$P$", b"$H$"];

/// Raised while parsing a setting. Never leaves this module through
/// [`verify_password`]; it only surfaces from the hash-generation helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("malformed portable hash setting")]
    MalformedHash,
}

/// Parsed 12-byte prefix of a stored hash.
struct HashSetting<'a> {
    prefix: &'a [u8],
    count_log2: u32,
    salt: &'a [u8],
}

impl<'a> HashSetting<'a> {
    fn parse(setting: &'a [u8]) -> Result<Self, HashError> {
        let tag = setting.get(..3).ok_or(HashError::MalformedHash)?;
        if !TAGS.iter().any(|t| t.as_slice() == tag) {
            return Err(HashError::MalformedHash);
        }

        let count_log2 = setting
            .get(3)
            .and_then(|&c| decode_count(c))
            .filter(|n| (MIN_COUNT_LOG2..=MAX_COUNT_LOG2).contains(n))
            .ok_or(HashError::MalformedHash)?;

        let salt = setting.get(4..SETTING_LEN).ok_or(HashError::MalformedHash)?;
        debug_assert_eq!(salt.len(), SALT_LEN);

        Ok(Self {
            prefix: &setting[..SETTING_LEN],
            count_log2,
            salt,
        })
    }
}

/// Position of `c` in [`ITOA64`]
pub fn decode_count(c: u8) -> Option<u32> {
    ITOA64.iter().position(|&a| a == c).map(|p| p as u32)
}

/// Packed little-endian base64 over [`ITOA64`].
///
/// Each 3-byte group yields 4 characters; a trailing group of 1 or 2 bytes
/// yields 2 or 3 characters, so 16 bytes encode to 22 characters.
pub fn encode64(input: &[u8]) -> String {
    let mut out = String::with_capacity((input.len() * 4).div_ceil(3));
    for chunk in input.chunks(3) {
        let value = chunk
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &b)| acc | (u32::from(b) << (8 * i)));

        out.push(ITOA64[(value & 0x3f) as usize] as char);
        out.push(ITOA64[((value >> 6) & 0x3f) as usize] as char);
        if chunk.len() > 1 {
            out.push(ITOA64[((value >> 12) & 0x3f) as usize] as char);
        }
        if chunk.len() > 2 {
            out.push(ITOA64[((value >> 18) & 0x3f) as usize] as char);
        }
    }
    out
}

/// `MD5(salt ++ password)` followed by `2^count_log2` rounds of
/// `MD5(digest ++ password)`.
fn stretch(password: &[u8], salt: &[u8], count_log2: u32) -> [u8; 16] {
    let mut digest = md5::compute([salt, password].concat()).0;

    let mut buf = Vec::with_capacity(digest.len() + password.len());
    for _ in 0..(1u64 << count_log2) {
        buf.clear();
        buf.extend_from_slice(&digest);
        buf.extend_from_slice(password);
        digest = md5::compute(&buf).0;
    }
    digest
}

/// Compute the full hash string for `setting`, or the failure sentinel.
///
/// The sentinel (`*0`, or `*1` when the setting itself starts with `*0`)
/// can never equal a stored hash.
fn crypt_private(password: &[u8], setting: &[u8]) -> Vec<u8> {
    match HashSetting::parse(setting) {
        Ok(parsed) => {
            let digest = stretch(password, parsed.salt, parsed.count_log2);
            let mut out = parsed.prefix.to_vec();
            out.extend_from_slice(encode64(&digest).as_bytes());
            out
        }
        Err(_) if setting.starts_with(b"*0") => b"*1".to_vec(),
        Err(_) => b"*0".to_vec(),
    }
}

/// Check `password` against a stored portable hash.
///
/// Never panics; malformed hashes simply do not match. Passwords are hashed
/// as their UTF-8 bytes, and the empty password is hashed like any other.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let computed = crypt_private(password.as_bytes(), stored_hash.as_bytes());
    if computed.first() == Some(&b'*') {
        debug!("stored hash is not a valid portable hash setting");
        return false;
    }
    constant_time_eq(&computed, stored_hash.as_bytes())
}

/// Deterministic `$P$` hash for an explicit salt and iteration exponent.
///
/// `salt` must be exactly 8 ASCII bytes; `count_log2` must lie in
/// `[MIN_COUNT_LOG2, MAX_COUNT_LOG2]`.
pub fn hash_with_salt(password: &str, salt: &str, count_log2: u32) -> Result<String, HashError> {
    if salt.len() != SALT_LEN || !salt.is_ascii() {
        return Err(HashError::MalformedHash);
    }
    if !(MIN_COUNT_LOG2..=MAX_COUNT_LOG2).contains(&count_log2) {
        return Err(HashError::MalformedHash);
    }

    let mut setting = String::with_capacity(SETTING_LEN);
    setting.push_str("$P$");
    setting.push(ITOA64[count_log2 as usize] as char);
    setting.push_str(salt);

    let out = crypt_private(password.as_bytes(), setting.as_bytes());
    // prefix and digest are both ASCII
    String::from_utf8(out).map_err(|_| HashError::MalformedHash)
}

/// Fresh `$P$` setting for a hasher of the given strength.
///
/// Strengths outside `4..=31` fall back to [`DEFAULT_STRENGTH`], and the
/// written exponent is capped at [`MAX_COUNT_LOG2`].
pub fn generate_setting(strength: u32) -> String {
    let strength = if (4..=31).contains(&strength) {
        strength
    } else {
        DEFAULT_STRENGTH
    };

    let mut raw = [0u8; 6];
    rand::rng().fill(&mut raw);

    let mut setting = String::with_capacity(SETTING_LEN);
    setting.push_str("$P$");
    setting.push(ITOA64[(strength + 5).min(MAX_COUNT_LOG2) as usize] as char);
    setting.push_str(&encode64(&raw));
    setting
}

/// Hash a password with a random salt, as the partner platform would.
pub fn hash_password(password: &str, strength: u32) -> Result<String, HashError> {
    let setting = generate_setting(strength);
    let out = crypt_private(password.as_bytes(), setting.as_bytes());
    if out.first() == Some(&b'*') {
        return Err(HashError::MalformedHash);
    }
    String::from_utf8(out).map_err(|_| HashError::MalformedHash)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors produced by the legacy implementation.
    const PHPASS_VECTOR: &str = "$P$9IQRaTwmfeRo7ud9Fh4E2PdI0S3r.L0";
    const HUNTER2_LOG8: &str = "$P$6abcdefghd6u70gBEMxKaM6FHBTeGv0";
    const HUNTER2_WP: &str = "$P$BJn2c8DCxz66LJR/5jOAXL6WPVlqJ9/";
    const EMPTY_H: &str = "$H$7saltsaltIKdaRXd8XoAff4IfY5Hiu.";
    const UNICODE: &str = "$P$7Zq/9x.A1G6nUxloy3QXzoo7o159Cr.";

    #[test]
    fn test_known_vectors() {
        assert!(verify_password("test12345", PHPASS_VECTOR));
        assert!(verify_password("hunter2", HUNTER2_LOG8));
        assert!(verify_password("hunter2", HUNTER2_WP));
        assert!(verify_password("", EMPTY_H));
        assert!(verify_password("pässwörd", UNICODE));
    }

    #[test]
    fn test_wrong_password() {
        assert!(!verify_password("test1234", PHPASS_VECTOR));
        assert!(!verify_password("Hunter2", HUNTER2_LOG8));
        assert!(!verify_password("x", EMPTY_H));
        assert!(!verify_password("passwort", UNICODE));
    }

    #[test]
    fn test_encode64_vectors() {
        let bytes: Vec<u8> = (0u8..16).collect();
        assert_eq!(encode64(&bytes), ".2U.1EE/4Q.07ck0AoU1D.");
        assert_eq!(encode64(&[0]), "..");
        assert_eq!(encode64(&[0xff, 0xff]), "zzD");
        assert_eq!(encode64(b"abc"), "V7qM");
        assert_eq!(encode64(&[0u8; 16]).len(), 22);
    }

    #[test]
    fn test_decode_count() {
        assert_eq!(decode_count(b'.'), Some(0));
        assert_eq!(decode_count(b'6'), Some(8));
        assert_eq!(decode_count(b'B'), Some(13));
        assert_eq!(decode_count(b'z'), Some(63));
        assert_eq!(decode_count(b'!'), None);
    }

    #[test]
    fn test_hash_with_salt_matches_vectors() {
        assert_eq!(hash_with_salt("hunter2", "abcdefgh", 8).unwrap(), HUNTER2_LOG8);
        assert_eq!(hash_with_salt("test12345", "IQRaTwmf", 11).unwrap(), PHPASS_VECTOR);
    }

    #[test]
    fn test_round_trip() {
        for (password, salt, count) in [
            ("", "........", 7),
            ("correct horse", "zzzzzzzz", 7),
            ("p@ss word", "a1B2c3D4", 9),
            ("日本語", "Salt/./.", 8),
        ] {
            let hash = hash_with_salt(password, salt, count).unwrap();
            assert_eq!(hash.len(), 34);
            assert!(verify_password(password, &hash), "{password:?} / {salt}");
        }
    }

    #[test]
    fn test_digest_mutation_rejected() {
        let original = HUNTER2_LOG8.as_bytes();
        for pos in SETTING_LEN..original.len() {
            let mut mutated = original.to_vec();
            mutated[pos] = if mutated[pos] == b'.' { b'/' } else { b'.' };
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(!verify_password("hunter2", &mutated), "position {pos}");
        }
    }

    #[test]
    fn test_malformed_hashes_fail_closed() {
        let cases = [
            "",
            "$P$",
            "$P$B",
            "$P$B1234",
            "$X$6abcdefghd6u70gBEMxKaM6FHBTeGv0",
            "$P$!abcdefghd6u70gBEMxKaM6FHBTeGv0",
            // exponent 6 and 31 are out of range
            "$P$4abcdefghd6u70gBEMxKaM6FHBTeGv0",
            "$P$Tabcdefghd6u70gBEMxKaM6FHBTeGv0",
            "*0",
            "*1",
            "$2y$10$abcdefghijklmnopqrstuv",
            "$P$6abcdéfghd6u70gBEMxKaM6FHBTeGv0",
        ];
        for hash in cases {
            assert!(!verify_password("hunter2", hash), "{hash:?}");
            assert!(!verify_password("", hash), "{hash:?}");
        }
    }

    #[test]
    fn test_truncated_digest_rejected() {
        assert!(!verify_password("hunter2", &HUNTER2_LOG8[..33]));
        assert!(!verify_password("hunter2", &HUNTER2_LOG8[..12]));
        let mut extended = HUNTER2_LOG8.to_string();
        extended.push('.');
        assert!(!verify_password("hunter2", &extended));
    }

    #[test]
    fn test_failure_sentinel() {
        assert_eq!(crypt_private(b"pw", b"garbage"), b"*0");
        assert_eq!(crypt_private(b"pw", b"*0garbage"), b"*1");
    }

    #[test]
    fn test_hash_with_salt_rejects_bad_input() {
        assert_eq!(hash_with_salt("pw", "short", 8), Err(HashError::MalformedHash));
        assert_eq!(hash_with_salt("pw", "abcdefgh", 6), Err(HashError::MalformedHash));
        assert_eq!(hash_with_salt("pw", "abcdefgh", 31), Err(HashError::MalformedHash));
        assert_eq!(hash_with_salt("pw", "abcdéfg", 8), Err(HashError::MalformedHash));
    }

    #[test]
    fn test_generate_setting_shape() {
        let setting = generate_setting(DEFAULT_STRENGTH);
        assert_eq!(setting.len(), SETTING_LEN);
        assert!(setting.starts_with("$P$B"));
        assert!(setting.bytes().skip(3).all(|c| ITOA64.contains(&c)));

        // out-of-range strength falls back to the default
        assert!(generate_setting(2).starts_with("$P$B"));
        // exponent is capped
        assert!(generate_setting(30).starts_with("$P$S"));
    }

    #[test]
    fn test_hash_password_round_trip() {
        // strength 4 writes exponent 9
        let hash = hash_password("hunter2", 4).unwrap();
        assert!(hash.starts_with("$P$7"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));

        let other = hash_password("hunter2", 4).unwrap();
        assert_ne!(hash, other, "salts should differ");
    }
}
