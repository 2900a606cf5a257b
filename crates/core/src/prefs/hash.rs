//! Stable hashing for experiment bucketing.

use sha2::{Digest, Sha256};

/// Hash an experiment/subject pair to a stable 64-bit bucket value.
pub fn bucket_hash(experiment: &str, subject: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(experiment.as_bytes());
    hasher.update(b"\n");
    hasher.update(subject.as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Hex digest of an experiment/subject pair, for logs.
pub fn bucket_digest(experiment: &str, subject: &str) -> String {
    hex::encode(bucket_hash(experiment, subject).to_be_bytes())
}
