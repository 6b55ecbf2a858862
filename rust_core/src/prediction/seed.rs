use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

/// Stable 64-bit seed for `(away, home, key)`.
///
/// The first eight bytes of SHA-256 over `away|home|key`, little endian.
/// Independent of process, platform and hasher randomization.
pub fn matchup_seed(away: &str, home: &str, key: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(away.as_bytes());
    hasher.update(b"|");
    hasher.update(home.as_bytes());
    hasher.update(b"|");
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Fresh generator for one model/matchup; never shared between calls.
pub fn matchup_rng(away: &str, home: &str, key: &str) -> StdRng {
    StdRng::seed_from_u64(matchup_seed(away, home, key))
}
