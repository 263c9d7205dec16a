//! Deterministic string hashing.
//!
//! Every name that has to survive baking (action kinds, blackboard keys, animator
//! parameters) is turned into an integer with FNV-1a.
//! The hash is computed over UTF-16 code units so that a name hashes to the same value
//! no matter which tool produced the graph, and it never depends on the process or the
//! platform, unlike [`std::collections::hash_map::DefaultHasher`].

const FNV32_OFFSET_BASIS: u32 = 2166136261;
const FNV32_PRIME: u32 = 16777619;
const FNV64_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV64_PRIME: u64 = 1099511628211;

/// 32-bit FNV-1a of `s`, as an unsigned value. The empty string hashes to 0.
pub fn hash32_unsigned(s: &str) -> u32 {
    if s.is_empty() {
        return 0;
    }
    s.encode_utf16().fold(FNV32_OFFSET_BASIS, |hash, unit| {
        (hash ^ unit as u32).wrapping_mul(FNV32_PRIME)
    })
}

/// 32-bit FNV-1a of `s`, reinterpreted as signed. This is the form stored in baked nodes
/// and used as blackboard keys.
pub fn hash32(s: &str) -> i32 {
    hash32_unsigned(s) as i32
}

/// 64-bit FNV-1a of `s`, reinterpreted as signed. The empty string hashes to 0.
pub fn hash64(s: &str) -> i64 {
    if s.is_empty() {
        return 0;
    }
    s.encode_utf16().fold(FNV64_OFFSET_BASIS, |hash, unit| {
        (hash ^ unit as u64).wrapping_mul(FNV64_PRIME)
    }) as i64
}

/// Mixes two hashes into one: `(rotl(h1, 5) + h1) ^ h2`.
///
/// Used to derive per-node keys from a name hash and an index, e.g. the wait timer key.
pub fn combine(h1: i32, h2: i32) -> i32 {
    let rol5 = (h1 as u32).rotate_left(5);
    (rol5 as i32).wrapping_add(h1) ^ h2
}

/// Left fold of [`combine`]. An empty slice yields 0.
pub fn combine_all(hashes: &[i32]) -> i32 {
    match hashes.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, h| combine(acc, *h)),
        None => 0,
    }
}
