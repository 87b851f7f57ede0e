use ledger_core::constants::{
    PASSPHRASE_GEN_MAX_ATTEMPTS, PASSPHRASE_MAX_LEN, PASSPHRASE_MIN_CLASS_COUNT, PASSPHRASE_MIN_LEN,
    PASSPHRASE_SPECIAL_CHARS,
};
use rand::Rng;

/// Length in [12,24], with >=2 uppercase, >=2 lowercase, >=2 digits, and
/// >=2 characters from the special-character set.
pub fn is_strong(passphrase: &str) -> bool {
    let len = passphrase.chars().count();
    if !(PASSPHRASE_MIN_LEN..=PASSPHRASE_MAX_LEN).contains(&len) {
        return false;
    }
    let upper = passphrase.chars().filter(|c| c.is_ascii_uppercase()).count();
    let lower = passphrase.chars().filter(|c| c.is_ascii_lowercase()).count();
    let digit = passphrase.chars().filter(|c| c.is_ascii_digit()).count();
    let special = passphrase
        .chars()
        .filter(|c| PASSPHRASE_SPECIAL_CHARS.contains(*c))
        .count();
    upper >= PASSPHRASE_MIN_CLASS_COUNT
        && lower >= PASSPHRASE_MIN_CLASS_COUNT
        && digit >= PASSPHRASE_MIN_CLASS_COUNT
        && special >= PASSPHRASE_MIN_CLASS_COUNT
}

/// Generates a 24-char passphrase satisfying [`is_strong`] within
/// [`PASSPHRASE_GEN_MAX_ATTEMPTS`] attempts.
pub fn generate_random_password() -> String {
    const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    const DIGITS: &[u8] = b"0123456789";
    let special: Vec<char> = PASSPHRASE_SPECIAL_CHARS.chars().collect();

    let mut rng = rand::thread_rng();
    for _ in 0..PASSPHRASE_GEN_MAX_ATTEMPTS {
        let mut chars: Vec<char> = Vec::with_capacity(PASSPHRASE_MAX_LEN);
        for _ in 0..2 {
            chars.push(UPPER[rng.gen_range(0..UPPER.len())] as char);
            chars.push(LOWER[rng.gen_range(0..LOWER.len())] as char);
            chars.push(DIGITS[rng.gen_range(0..DIGITS.len())] as char);
            chars.push(special[rng.gen_range(0..special.len())]);
        }
        const ALL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let all: Vec<char> = ALL.chars().collect();
        while chars.len() < PASSPHRASE_MAX_LEN {
            chars.push(all[rng.gen_range(0..all.len())]);
        }
        // Fisher-Yates shuffle so the required classes aren't clustered up front.
        for i in (1..chars.len()).rev() {
            let j = rng.gen_range(0..=i);
            chars.swap(i, j);
        }
        let candidate: String = chars.into_iter().collect();
        if is_strong(&candidate) {
            return candidate;
        }
    }
    unreachable!("constructed candidate always satisfies the strength rule")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_password_is_strong() {
        for _ in 0..50 {
            assert!(is_strong(&generate_random_password()));
        }
    }

    #[test]
    fn too_short_is_weak() {
        assert!(!is_strong("Ab1!Ab1!"));
    }

    #[test]
    fn missing_class_is_weak() {
        assert!(!is_strong("aaaaaaaaaaaaaaaaaaaaaaaa"));
    }
}
