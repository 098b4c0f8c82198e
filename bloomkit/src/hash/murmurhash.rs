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

use byteorder::ByteOrder;
use byteorder::LE;

const C1: u64 = 0x87c37b91114253d5;
const C2: u64 = 0x4cf5ad432745937f;

/// Computes the 128-bit MurmurHash3 (x64 variant) of `data`.
///
/// Returns the two 64-bit halves `(h1, h2)` in the order the reference implementation emits them.
///
/// # Examples
///
/// ```
/// # use bloomkit::hash::murmur3_x64_128;
/// let (h1, h2) = murmur3_x64_128(b"The quick brown fox jumps over the lazy dog", 0);
/// assert_eq!(h1, 0xe34bbc7bbc071b6c);
/// assert_eq!(h2, 0x7a433ca9c49a9347);
/// ```
pub fn murmur3_x64_128(data: &[u8], seed: u64) -> (u64, u64) {
    let mut h1 = seed;
    let mut h2 = seed;

    let mut blocks = data.chunks_exact(16);
    for block in &mut blocks {
        let k1 = LE::read_u64(&block[..8]);
        let k2 = LE::read_u64(&block[8..]);

        h1 ^= mix_k1(k1);
        h1 = h1
            .rotate_left(27)
            .wrapping_add(h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dce729);

        h2 ^= mix_k2(k2);
        h2 = h2
            .rotate_left(31)
            .wrapping_add(h1)
            .wrapping_mul(5)
            .wrapping_add(0x38495ab5);
    }

    let tail = blocks.remainder();
    if tail.len() > 8 {
        h2 ^= mix_k2(read_partial_u64(&tail[8..]));
    }
    if !tail.is_empty() {
        h1 ^= mix_k1(read_partial_u64(&tail[..tail.len().min(8)]));
    }

    let len = data.len() as u64;
    h1 ^= len;
    h2 ^= len;
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    (h1, h2)
}

#[inline]
fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

#[inline]
fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

/// Reads up to 8 trailing bytes as a little-endian word, zero-filling the high bytes.
#[inline]
fn read_partial_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    LE::read_u64(&buf)
}

/// Finalization mix: force all bits of a hash block to avalanche.
#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^ (k >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_lengths() {
        // tail > 8
        let (h1, h2) = murmur3_x64_128(b"The quick brown fox jumps over the lazy dog", 0);
        assert_eq!((h1, h2), (0xe34bbc7bbc071b6c, 0x7a433ca9c49a9347));

        // tail < 8
        let (h1, h2) = murmur3_x64_128(b"The quick brown fox jumps over the lazy dogdogdog", 0);
        assert_eq!((h1, h2), (0x9c8205300e612fc4, 0xcbc0af6136aa3df9));

        // tail == 8
        let (h1, h2) = murmur3_x64_128(b"The quick brown fox jumps over the lazy1", 0);
        assert_eq!((h1, h2), (0xe3301a827e5cdfe3, 0xbdbf05f8da0f0392));

        // no tail
        let (h1, h2) = murmur3_x64_128(b"The quick brown fox jumps over t", 0);
        assert_eq!((h1, h2), (0xdf6af91bb29bdacf, 0x91a341c58df1f3a6));
    }

    #[test]
    fn test_single_bit_flip_changes_both_halves() {
        let a = murmur3_x64_128(b"The quick brown fox jumps over the lazy dog", 0);
        let b = murmur3_x64_128(b"The quick brown fox jumps over the lazy eog", 0);
        assert_eq!(b, (0x362108102c62d1c9, 0x3285cd100292b305));
        assert_ne!(a.0, b.0);
        assert_ne!(a.1, b.1);
    }

    #[test]
    fn test_high_and_zero_bytes() {
        let mut key = b"The quick brown fox jumps over the lazy dog".to_vec();
        key.extend_from_slice(&[0xff, 0x64, 0x6f, 0x67, 0x00]);
        let (h1, h2) = murmur3_x64_128(&key, 0);
        assert_eq!((h1, h2), (0xe88abda785929c9e, 0x96b98587cacc83d6));
    }

    #[test]
    fn test_empty_input_with_zero_seed() {
        assert_eq!(murmur3_x64_128(&[], 0), (0, 0));
    }
}
