use rand::Rng;

/// No 0/O or 1/I, codes get typed in by hand.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const GAME_ID_LENGTH: usize = 12;

pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn generate_game_id() -> String {
    let mut rng = rand::rng();
    (0..GAME_ID_LENGTH)
        .map(|_| format!("{:x}", rng.random_range(0..16u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_uses_alphabet() {
        let code = generate_code(32);
        assert_eq!(code.len(), 32);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_game_id_is_hex() {
        let id = generate_game_id();
        assert_eq!(id.len(), GAME_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
