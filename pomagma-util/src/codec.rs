//! Delta codec for the monotone sparse `(key, value)` sequences used by snapshot sections (see
//! the snapshot format in the crate-level documentation): keys are strictly increasing obs, so
//! they compress well as a "gap minus one" sequence; values are arbitrary obs, stored as a plain
//! first-difference sequence.

use serde::{Deserialize, Serialize};

/// A delta-encoded `(key, value)` sparse map section, ready to be `bincode`-serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaMap {
    /// `key_diff_minus_one[i] = key[i] - key[i-1] - 1`, with `key[-1] := 0`.
    pub key_diff_minus_one: Vec<u32>,
    /// `val_diff[i] = val[i] - val[i-1]`, with `val[-1] := 0`.
    pub val_diff: Vec<i64>,
}

/// Encodes a sequence of `(key, value)` pairs sorted by strictly increasing key.
pub fn compress(pairs: &[(u32, u32)]) -> DeltaMap {
    let mut key_diff_minus_one = Vec::with_capacity(pairs.len());
    let mut val_diff = Vec::with_capacity(pairs.len());
    let mut prev_key: i64 = 0;
    let mut prev_val: i64 = 0;
    for &(key, val) in pairs {
        key_diff_minus_one.push((key as i64 - prev_key - 1) as u32);
        val_diff.push(val as i64 - prev_val);
        prev_key = key as i64;
        prev_val = val as i64;
    }
    DeltaMap {
        key_diff_minus_one,
        val_diff,
    }
}

/// Inverse of [`compress`]; recovers the original `(key, value)` pairs by prefix sum.
pub fn decompress(map: &DeltaMap) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(map.key_diff_minus_one.len());
    let mut prev_key: i64 = 0;
    let mut prev_val: i64 = 0;
    for (&kd, &vd) in map.key_diff_minus_one.iter().zip(map.val_diff.iter()) {
        let key = prev_key + kd as i64 + 1;
        let val = prev_val + vd;
        out.push((key as u32, val as u32));
        prev_key = key;
        prev_val = val;
    }
    out
}

/// Delta-encoded sparse map over a composite `(lhs, rhs)` key, used by the pair-keyed table
/// sections (`BinaryRelation`, `BinaryFunction`, `SymmetricFunction`). Pairs sorted in row-major
/// order (`lhs` then `rhs`) have a monotone composite key `lhs * (item_dim + 1) + rhs`, so the
/// same gap-minus-one trick as [`DeltaMap`] applies, widened to 64 bits since the composite key
/// can exceed `u32::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaMap2D {
    pub key_diff_minus_one: Vec<u64>,
    pub val_diff: Vec<i64>,
}

fn linearize(item_dim: u32, lhs: u32, rhs: u32) -> u64 {
    lhs as u64 * (item_dim as u64 + 1) + rhs as u64
}

fn delinearize(item_dim: u32, key: u64) -> (u32, u32) {
    let stride = item_dim as u64 + 1;
    ((key / stride) as u32, (key % stride) as u32)
}

/// Encodes a sequence of `(lhs, rhs, val)` triples sorted in row-major `(lhs, rhs)` order.
pub fn compress2d(item_dim: u32, triples: &[(u32, u32, u32)]) -> DeltaMap2D {
    let mut key_diff_minus_one = Vec::with_capacity(triples.len());
    let mut val_diff = Vec::with_capacity(triples.len());
    let mut prev_key: i128 = -1;
    let mut prev_val: i64 = 0;
    for &(lhs, rhs, val) in triples {
        let key = linearize(item_dim, lhs, rhs) as i128;
        key_diff_minus_one.push((key - prev_key - 1) as u64);
        val_diff.push(val as i64 - prev_val);
        prev_key = key;
        prev_val = val as i64;
    }
    DeltaMap2D {
        key_diff_minus_one,
        val_diff,
    }
}

/// Inverse of [`compress2d`].
pub fn decompress2d(item_dim: u32, map: &DeltaMap2D) -> Vec<(u32, u32, u32)> {
    let mut out = Vec::with_capacity(map.key_diff_minus_one.len());
    let mut prev_key: i128 = -1;
    let mut prev_val: i64 = 0;
    for (&kd, &vd) in map.key_diff_minus_one.iter().zip(map.val_diff.iter()) {
        let key = prev_key + kd as i128 + 1;
        let val = prev_val + vd;
        let (lhs, rhs) = delinearize(item_dim, key as u64);
        out.push((lhs, rhs, val as u32));
        prev_key = key;
        prev_val = val;
    }
    out
}

/// Delta-encoded sparse set of strictly increasing `u32` keys, with no associated value; used by
/// the relation table sections (`UnaryRelation`'s member set, and the carrier's own support bits
/// are packed separately, see `pomagma-structure::snapshot`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaSet {
    pub key_diff_minus_one: Vec<u32>,
}

pub fn compress_set(keys: &[u32]) -> DeltaSet {
    let mut key_diff_minus_one = Vec::with_capacity(keys.len());
    let mut prev: i64 = 0;
    for &key in keys {
        key_diff_minus_one.push((key as i64 - prev - 1) as u32);
        prev = key as i64;
    }
    DeltaSet { key_diff_minus_one }
}

pub fn decompress_set(set: &DeltaSet) -> Vec<u32> {
    let mut out = Vec::with_capacity(set.key_diff_minus_one.len());
    let mut prev: i64 = 0;
    for &kd in &set.key_diff_minus_one {
        let key = prev + kd as i64 + 1;
        out.push(key as u32);
        prev = key;
    }
    out
}

/// As [`DeltaSet`], but over the same linearized `(lhs, rhs)` composite key as [`DeltaMap2D`];
/// used by `BinaryRelation`'s pair set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaPairSet {
    pub key_diff_minus_one: Vec<u64>,
}

pub fn compress_pair_set(item_dim: u32, pairs: &[(u32, u32)]) -> DeltaPairSet {
    let mut key_diff_minus_one = Vec::with_capacity(pairs.len());
    let mut prev_key: i128 = -1;
    for &(lhs, rhs) in pairs {
        let key = linearize(item_dim, lhs, rhs) as i128;
        key_diff_minus_one.push((key - prev_key - 1) as u64);
        prev_key = key;
    }
    DeltaPairSet { key_diff_minus_one }
}

pub fn decompress_pair_set(item_dim: u32, set: &DeltaPairSet) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(set.key_diff_minus_one.len());
    let mut prev_key: i128 = -1;
    for &kd in &set.key_diff_minus_one {
        let key = prev_key + kd as i128 + 1;
        out.push(delinearize(item_dim, key as u64));
        prev_key = key;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_spec_example() {
        let pairs = vec![(1, 2), (99, 22222), (999, 22), (9999, 2222), (99999, 222)];
        let encoded = compress(&pairs);
        assert_eq!(
            encoded.key_diff_minus_one,
            vec![0, 97, 899, 8999, 89999]
        );
        assert_eq!(encoded.val_diff, vec![2, 22220, -22200, 2200, -2000]);
        assert_eq!(decompress(&encoded), pairs);
    }

    #[test]
    fn round_trips_empty() {
        let pairs: Vec<(u32, u32)> = vec![];
        let encoded = compress(&pairs);
        assert!(encoded.key_diff_minus_one.is_empty());
        assert_eq!(decompress(&encoded), pairs);
    }

    #[test]
    fn round_trips_single_pair() {
        let pairs = vec![(5u32, 7u32)];
        assert_eq!(decompress(&compress(&pairs)), pairs);
    }

    #[test]
    fn round_trips_2d_triples() {
        let item_dim = 100;
        let triples = vec![(1, 2, 9), (1, 50, 4), (3, 1, 7), (99, 99, 1)];
        let encoded = compress2d(item_dim, &triples);
        assert_eq!(decompress2d(item_dim, &encoded), triples);
    }

    #[test]
    fn round_trips_2d_empty() {
        let encoded = compress2d(10, &[]);
        assert!(decompress2d(10, &encoded).is_empty());
    }

    #[test]
    fn round_trips_delta_set() {
        let keys = vec![1u32, 2, 5, 99, 1000];
        assert_eq!(decompress_set(&compress_set(&keys)), keys);
    }

    #[test]
    fn round_trips_delta_pair_set() {
        let item_dim = 50;
        let pairs = vec![(1u32, 2u32), (1, 40), (2, 1), (49, 49)];
        let encoded = compress_pair_set(item_dim, &pairs);
        assert_eq!(decompress_pair_set(item_dim, &encoded), pairs);
    }
}
