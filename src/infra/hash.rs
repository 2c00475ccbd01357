use std::hash::Hasher;

use twox_hash::XxHash64;

pub fn hash64(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

/// Content hash as stored in the repository index.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:016x}", hash64(bytes))
}
