use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Bytes of OS entropy behind every generated database password.
pub const PASSWORD_BYTES: usize = 24;

/// Generate a database password: `PASSWORD_BYTES` random bytes,
/// base64-encoded.
#[must_use]
pub fn generate_password() -> String {
    let mut bytes = [0u8; PASSWORD_BYTES];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_to_at_least_sixteen_bytes() {
        let password = generate_password();
        let raw = STANDARD.decode(&password).unwrap();

        assert!(raw.len() >= 16);
        assert_eq!(raw.len(), PASSWORD_BYTES);
    }

    #[test]
    fn distinct_across_calls() {
        let a = generate_password();
        let b = generate_password();

        assert_ne!(a, b);
    }

    #[test]
    fn no_padding_or_whitespace() {
        // 24 bytes encode to exactly 32 characters without '='.
        let password = generate_password();

        assert_eq!(password.len(), 32);
        assert!(!password.contains('='));
        assert!(!password.chars().any(char::is_whitespace));
    }
}
