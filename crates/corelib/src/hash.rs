//! Stable hashing for selection seeds.
//!
//! `std`'s `DefaultHasher` is randomly keyed per process, so it cannot be
//! used where the same inputs must reproduce the same node set on every
//! host. SipHash-1-3 with a fixed key gives a stable value everywhere.

use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

/// Fixed key shared by every process.
const SEED_HASH_KEY: (u64, u64) = (0x6e6f_6465_7365_7400, 0x646f_6d61_696e_0001);

/// Hash a domain name to a `u64`.
#[inline]
pub fn domain_hash(domain: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(SEED_HASH_KEY.0, SEED_HASH_KEY.1);
    domain.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_hash_deterministic() {
        assert_eq!(domain_hash("rg1.dc1.cl1.ro1.rk1"), domain_hash("rg1.dc1.cl1.ro1.rk1"));
    }

    #[test]
    fn test_domain_hash_distinguishes_domains() {
        assert_ne!(domain_hash("rg1.dc1.cl1.ro1.rk1"), domain_hash("rg1.dc1.cl1.ro1.rk2"));
        assert_ne!(domain_hash(""), domain_hash("rg1"));
    }
}
