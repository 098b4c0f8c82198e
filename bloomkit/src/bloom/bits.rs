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

/// A fixed-capacity bit vector packed into `u64` words.
///
/// Bit `i` lives in word `i / 64` at position `i % 64`, least significant bit first. The exported
/// words are exactly the stored words, so a store rebuilt from them has the same capacity and
/// answers every `test` identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BitStore {
    words: Vec<u64>,
}

impl BitStore {
    /// Allocates a zeroed store of `num_bits` rounded up to a whole number of words.
    pub fn new(num_bits: u64) -> Self {
        let num_words = num_bits.div_ceil(64) as usize;
        BitStore {
            words: vec![0u64; num_words],
        }
    }

    /// Wraps previously exported words. The capacity is `words.len() * 64`.
    pub fn from_words(words: Vec<u64>) -> Self {
        BitStore { words }
    }

    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    pub fn num_bits(&self) -> u64 {
        self.words.len() as u64 * 64
    }

    /// Sets a bit and returns whether it was previously clear.
    pub fn set(&mut self, index: u64) -> bool {
        let (word, mask) = locate(index);
        let was_clear = self.words[word] & mask == 0;
        self.words[word] |= mask;
        was_clear
    }

    pub fn test(&self, index: u64) -> bool {
        let (word, mask) = locate(index);
        self.words[word] & mask != 0
    }

    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// ORs `other` into this store. Both stores must have the same number of words.
    pub fn union_with(&mut self, other: &BitStore) {
        debug_assert_eq!(self.words.len(), other.words.len());
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= *other_word;
        }
    }
}

#[inline]
fn locate(index: u64) -> (usize, u64) {
    ((index >> 6) as usize, 1u64 << (index & 63))
}
