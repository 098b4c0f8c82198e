// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;

use crate::hash::murmur3_x64_128;
use crate::hash::MURMUR3_SEED;

/// Translates an item's bytes into the bit positions it occupies.
///
/// Implementations must be deterministic: the same `(data, m, k)` always yields the same `k`
/// indexes, each in `[0, m)`, across calls and across processes. A filter's bits are only
/// meaningful under the strategy that set them.
pub trait HashStrategy: fmt::Debug + Send + Sync {
    /// Returns exactly `k` bit indexes for `data` in a filter of `m` bits.
    fn indexes(&self, data: &[u8], m: u64, k: u32) -> Vec<u64>;
}

/// Double hashing over 128-bit MurmurHash3 (Kirsch-Mitzenmacher).
///
/// With `(h1, h2) = murmur3_x64_128(data, 0)`, index `i` is
/// `((h1 + i * h2) & i64::MAX) % m`, computed with wrapping unsigned arithmetic. The sequence
/// matches Guava's `MURMUR128_MITZ_64` for the same inputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Murmur128Mitz64;

impl HashStrategy for Murmur128Mitz64 {
    fn indexes(&self, data: &[u8], m: u64, k: u32) -> Vec<u64> {
        let (h1, h2) = murmur3_x64_128(data, MURMUR3_SEED);
        let mut combined = h1;
        (0..k)
            .map(|_| {
                let index = (combined & i64::MAX as u64) % m;
                combined = combined.wrapping_add(h2);
                index
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_indexes() {
        let indexes = Murmur128Mitz64.indexes(b"this_is_a_test_string", 9600, 7);
        assert_eq!(indexes, vec![3942, 6555, 9168, 2181, 4794, 7407, 420]);
    }

    #[test]
    fn test_indexes_are_deterministic() {
        let first = Murmur128Mitz64.indexes(b"deterministic", 73_024, 5);
        let second = Murmur128Mitz64.indexes(b"deterministic", 73_024, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_count_and_range() {
        for (m, k) in [(64, 1), (960, 7), (9856, 12)] {
            let indexes = Murmur128Mitz64.indexes(b"range", m, k);
            assert_eq!(indexes.len(), k as usize);
            assert!(indexes.iter().all(|&i| i < m));
        }
    }

    #[test]
    fn test_empty_input() {
        // murmur3 of no bytes under seed 0 is (0, 0), so every index collapses to 0
        assert_eq!(Murmur128Mitz64.indexes(b"", 960, 3), vec![0, 0, 0]);
    }
}
