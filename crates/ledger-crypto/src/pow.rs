use ledger_core::BlockHeader;

/// `hash` as lowercase hex has at least `difficulty` leading `'0'` chars.
pub fn satisfies_difficulty(hash_hex: &str, difficulty: u8) -> bool {
    hash_hex
        .bytes()
        .take(difficulty as usize)
        .filter(|b| *b == b'0')
        .count()
        == difficulty as usize
}

/// Mine `header` in place: increment `nonce` from 0 until `header.hash()`
/// has `difficulty` leading hex-zero characters, or `max_nonce` is
/// exceeded (returns `None` — the caller logs and skips the round).
pub fn mine_block_header(header: &mut BlockHeader, difficulty: u8, max_nonce: u64) -> Option<String> {
    for nonce in 0..=max_nonce {
        header.nonce = nonce;
        let hash = header.hash();
        if satisfies_difficulty(&hash, difficulty) {
            return Some(hash);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> BlockHeader {
        BlockHeader {
            version: 1,
            previous_hash: "genesis".into(),
            timestamp: 0,
            merkle_root: String::new(),
            difficulty: 2,
            nonce: 0,
        }
    }

    #[test]
    fn mines_a_hash_meeting_difficulty() {
        let mut h = header();
        let hash = mine_block_header(&mut h, 2, 10_000_000).expect("should find a nonce");
        assert!(satisfies_difficulty(&hash, 2));
        assert!(h.nonce > 0 || satisfies_difficulty(&BlockHeader { nonce: 0, ..header() }.hash(), 2));
    }

    #[test]
    fn exhausting_max_nonce_returns_none() {
        let mut h = header();
        h.difficulty = 64; // unreachable within the bound
        assert!(mine_block_header(&mut h, 64, 100).is_none());
    }
}
