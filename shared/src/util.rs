/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Alphabet for customer-facing codes: no 0/O, 1/I/L.
const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Generate a voucher code such as `GIFT-7QX2-M9KD`.
pub fn generate_voucher_code(prefix: &str) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut group = || -> String {
        (0..4)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    };
    let first = group();
    let second = group();
    format!("{prefix}-{first}-{second}")
}

/// Unguessable token for invitation links.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Voucher codes are matched case-insensitively and without surrounding whitespace.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Minimal structural email check; delivery is the real validation.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Page slugs: lowercase ascii, digits and single dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voucher_code_shape() {
        let code = generate_voucher_code("GIFT");
        assert_eq!(code.len(), "GIFT-XXXX-XXXX".len());
        assert!(code.starts_with("GIFT-"));
        assert!(
            code[5..]
                .bytes()
                .all(|b| b == b'-' || CODE_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn snowflake_ids_are_positive_and_time_ordered() {
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = snowflake_id();
        assert!(a > 0);
        assert!(b >> 12 > a >> 12);
    }

    #[test]
    fn token_is_32_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn normalize_code_trims_and_uppercases() {
        assert_eq!(normalize_code("  summer-10 "), "SUMMER-10");
    }

    #[test]
    fn email_check() {
        assert!(is_valid_email("anna@studio.pl"));
        assert!(!is_valid_email("anna.studio.pl"));
        assert!(!is_valid_email("@studio.pl"));
        assert!(!is_valid_email("anna@studio"));
        assert!(!is_valid_email("an na@studio.pl"));
    }

    #[test]
    fn slug_check() {
        assert!(is_valid_slug("sesja-rodzinna"));
        assert!(is_valid_slug("about2"));
        assert!(!is_valid_slug("About"));
        assert!(!is_valid_slug("-lead"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug(""));
    }
}
