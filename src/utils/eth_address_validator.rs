use tiny_keccak::{Hasher, Keccak};

/// Checks that `address` is `0x` plus 40 hex digits and, when the digits are
/// mixed-case, that the casing is a correct EIP-55 checksum.
///
/// The verification endpoint always answers with checksummed addresses, so the
/// client uses this to reject a `signer` that could not have come from it.
pub fn is_valid_eth_address(address: &str) -> bool {
    let Some(digits) = address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) else {
        return false;
    };

    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    checksum_digits(digits) == digits
}

/// EIP-55 casing of a 40 digit hex address body.
fn checksum_digits(digits: &str) -> String {
    let lower = digits.to_ascii_lowercase();

    let mut hasher = Keccak::v256();
    hasher.update(lower.as_bytes());
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
            if nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}
