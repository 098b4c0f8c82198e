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

use super::bits::BitStore;
use super::estimate::MAX_NUM_WORDS;
use super::serialization::BloomFilterRecord;
use super::serialization::EMPTY_FLAG_MASK;
use super::serialization::HEADER_BYTES;
use super::serialization::SERIAL_VERSION;
use super::BloomFilterBuilder;
use super::HashStrategy;
use super::Murmur128Mitz64;
use crate::codec::family::Family;
use crate::codec::FrameReader;
use crate::codec::FrameWriter;
use crate::error::Error;
use crate::error::ErrorKind;

/// A fixed-size Bloom filter over byte strings.
///
/// Holds `m` bits (always a multiple of 64) and consults `k` of them per item, chosen by a
/// [`HashStrategy`]. Bits are only ever set, so an item that was put is reported by
/// [`might_contain`](Self::might_contain) for the rest of the filter's life.
///
/// The filter is not synchronized. `put` takes `&mut self`; wrap the filter in a lock to share
/// it between threads.
#[derive(Debug)]
pub struct BloomFilter {
    /// Number of hash-derived indexes per item (k)
    num_hashes: u32,
    /// Count of bits set to 1 (for statistics)
    num_bits_set: u64,
    /// Bit array, `m` bits
    bits: BitStore,
    strategy: Box<dyn HashStrategy>,
}

impl BloomFilter {
    /// Creates a filter sized for `max_items` insertions at false positive probability `fpp`,
    /// using the default [`Murmur128Mitz64`] strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if `max_items` is 0 or `fpp` is not in `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.put("A").put("B");
    ///
    /// assert!(filter.might_contain("A"));
    /// assert!(filter.might_contain("B"));
    /// assert!(!filter.might_contain("C"));
    /// ```
    pub fn new(max_items: u64, fpp: f64) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(max_items, fpp).build()
    }

    /// Like [`new`](Self::new) with a caller-supplied strategy.
    pub fn with_strategy(
        max_items: u64,
        fpp: f64,
        strategy: impl HashStrategy + 'static,
    ) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(max_items, fpp)
            .strategy(strategy)
            .build()
    }

    /// Rebuilds a filter from exported bit words and its hash count.
    ///
    /// The capacity is `words.len() * 64`. The default strategy is assumed; use
    /// [`from_words_with_strategy`](Self::from_words_with_strategy) for anything else.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if `words` is empty or `num_hashes` is 0.
    pub fn from_words(words: Vec<u64>, num_hashes: u32) -> Result<Self, Error> {
        Self::from_words_with_strategy(words, num_hashes, Murmur128Mitz64)
    }

    /// Like [`from_words`](Self::from_words) with a caller-supplied strategy.
    pub fn from_words_with_strategy(
        words: Vec<u64>,
        num_hashes: u32,
        strategy: impl HashStrategy + 'static,
    ) -> Result<Self, Error> {
        check_shape(&words, num_hashes).map_err(Error::invalid_argument)?;
        Ok(Self::from_parts(
            BitStore::from_words(words),
            num_hashes,
            Box::new(strategy),
        ))
    }

    pub(super) fn from_parts(
        bits: BitStore,
        num_hashes: u32,
        strategy: Box<dyn HashStrategy>,
    ) -> Self {
        BloomFilter {
            num_hashes,
            num_bits_set: bits.count_ones(),
            bits,
            strategy,
        }
    }

    /// Returns the capacity in bits (m).
    pub fn m(&self) -> u64 {
        self.bits.num_bits()
    }

    /// Returns the number of indexes consulted per item (k).
    pub fn k(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the strategy currently used to derive indexes.
    pub fn strategy(&self) -> &dyn HashStrategy {
        &*self.strategy
    }

    /// Replaces the index strategy.
    ///
    /// Bits already set keep the meaning given to them by the previous strategy, so this is only
    /// sound before the first [`put`](Self::put), or right after decoding a filter that was
    /// built with `strategy`.
    pub fn set_strategy(&mut self, strategy: impl HashStrategy + 'static) {
        self.strategy = Box::new(strategy);
    }

    /// Inserts `data`. Returns the filter so calls can be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1000, 0.01).unwrap();
    /// filter.put("apple").put(b"\x00\x01").put(vec![42u8; 3]);
    /// assert!(filter.might_contain("apple"));
    /// ```
    pub fn put(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        for index in self.indexes(data.as_ref()) {
            self.set_bit(index);
        }
        self
    }

    /// Tests whether `data` is possibly in the set.
    ///
    /// Returns:
    /// - `true`: `data` was **possibly** put (or this is a false positive)
    /// - `false`: `data` was **definitely not** put
    pub fn might_contain(&self, data: impl AsRef<[u8]>) -> bool {
        if self.is_empty() {
            return false;
        }
        self.indexes(data.as_ref())
            .into_iter()
            .all(|index| self.bits.test(index))
    }

    /// Tests and inserts `data` with a single hash computation.
    ///
    /// Returns whether `data` was possibly present before this call.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// assert!(!filter.contains_and_put("apple"));
    /// assert!(filter.contains_and_put("apple"));
    /// ```
    pub fn contains_and_put(&mut self, data: impl AsRef<[u8]>) -> bool {
        let indexes = self.indexes(data.as_ref());
        let was_present = indexes.iter().all(|&index| self.bits.test(index));
        for index in indexes {
            self.set_bit(index);
        }
        was_present
    }

    /// Returns whether no bit has been set.
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the fraction of bits set.
    ///
    /// False positive rates degrade quickly once this passes 0.5.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.m() as f64
    }

    /// Estimates the current false positive probability as `load_factor^k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(f64::from(self.num_hashes))
    }

    /// Returns whether `other` has the same `m` and `k`.
    ///
    /// Strategies cannot be compared; filters are only truly compatible if they also index with
    /// the same strategy.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.m() == other.m() && self.num_hashes == other.num_hashes
    }

    /// Merges `other` into this filter via bitwise OR.
    ///
    /// Afterwards this filter reports every item either filter reported.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if the filters differ in `m` or `k`.
    pub fn union(&mut self, other: &BloomFilter) -> Result<(), Error> {
        if !self.is_compatible(other) {
            return Err(
                Error::invalid_argument("cannot union incompatible bloom filters")
                    .with_context("m", self.m())
                    .with_context("k", self.num_hashes)
                    .with_context("other_m", other.m())
                    .with_context("other_k", other.num_hashes),
            );
        }
        self.bits.union_with(&other.bits);
        self.num_bits_set = self.bits.count_ones();
        Ok(())
    }

    /// Exports the filter as a `{m, k, bits}` record.
    pub fn serialize(&self) -> BloomFilterRecord {
        BloomFilterRecord {
            m: self.m(),
            k: self.num_hashes,
            bits: self.bits.as_words().to_vec(),
        }
    }

    /// Rebuilds a filter from a record, using the default strategy.
    ///
    /// The capacity is taken from `bits.len() * 64`; a record whose `m` disagrees is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidData`] if `bits` is empty, `k` is 0, or `m` does not match
    /// the payload.
    pub fn deserialize(record: BloomFilterRecord) -> Result<Self, Error> {
        check_shape(&record.bits, record.k).map_err(Error::deserial)?;

        let payload_bits = record.bits.len() as u64 * 64;
        if record.m != payload_bits {
            return Err(Error::deserial("stored m disagrees with bit payload")
                .with_context("m", record.m)
                .with_context("payload_bits", payload_bits));
        }

        tracing::debug!(m = record.m, k = record.k, "decoded bloom filter record");
        Ok(Self::from_parts(
            BitStore::from_words(record.bits),
            record.k,
            Box::new(Murmur128Mitz64),
        ))
    }

    /// Encodes the filter as a JSON record.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(10, 0.1).unwrap();
    /// filter.put("x");
    ///
    /// let json = filter.to_json().unwrap();
    /// let restored = BloomFilter::from_json(&json).unwrap();
    /// assert!(restored.might_contain("x"));
    /// ```
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self.serialize()).map_err(|err| {
            Error::new(
                ErrorKind::InvalidData,
                format!("failed to encode bloom filter record: {err}"),
            )
        })
    }

    /// Decodes a filter from a JSON record, using the default strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidData`] if the text is not a `{m, k, bits}` record, or the
    /// record is inconsistent (see [`deserialize`](Self::deserialize)).
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let record: BloomFilterRecord =
            serde_json::from_str(json).map_err(Error::malformed_record)?;
        Self::deserialize(record)
    }

    /// Encodes the filter into the compact binary frame.
    ///
    /// Layout (little-endian): preamble longs, serial version, family id, flags, `k` as u32,
    /// word count as u64, then the words unless the filter is empty.
    pub fn to_bytes(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let words = self.bits.as_words();
        let capacity = HEADER_BYTES + if is_empty { 0 } else { words.len() * 8 };
        let mut bytes = FrameWriter::with_capacity(capacity);

        bytes.write_u8(Family::BLOOMFILTER.pre_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(Family::BLOOMFILTER.id);
        bytes.write_u8(if is_empty { EMPTY_FLAG_MASK } else { 0 });
        bytes.write_u32_le(self.num_hashes);
        bytes.write_u64_le(words.len() as u64);

        if !is_empty {
            for &word in words {
                bytes.write_u64_le(word);
            }
        }

        bytes.into_bytes()
    }

    /// Decodes a filter from the binary frame, using the default strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidData`] if the frame is truncated, belongs to another family or
    /// version, or describes zero words or zero hashes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = FrameReader::new(bytes);

        let pre_longs = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("preamble_longs"))?;
        let serial_version = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("serial_version"))?;
        let family_id = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("family_id"))?;
        let flags = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("flags"))?;

        Family::BLOOMFILTER.validate_id(family_id)?;
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            ));
        }
        Family::BLOOMFILTER.validate_pre_longs(pre_longs)?;

        let num_hashes = cursor
            .read_u32_le()
            .map_err(|_| Error::insufficient_data("num_hashes"))?;
        let num_words = cursor
            .read_u64_le()
            .map_err(|_| Error::insufficient_data("num_words"))?;

        if num_words > MAX_NUM_WORDS {
            return Err(Error::deserial("word count exceeds the supported maximum")
                .with_context("num_words", num_words)
                .with_context("max_num_words", MAX_NUM_WORDS));
        }

        let is_empty = flags & EMPTY_FLAG_MASK != 0;
        if !is_empty && (cursor.remaining() as u64) / 8 < num_words {
            return Err(Error::insufficient_data("bits").with_context("num_words", num_words));
        }

        let num_words = num_words as usize;
        let mut words = Vec::new();
        words.try_reserve_exact(num_words).map_err(|err| {
            Error::deserial(format!("cannot allocate bit words: {err}"))
                .with_context("num_words", num_words)
        })?;
        if is_empty {
            words.resize(num_words, 0);
        } else {
            for _ in 0..num_words {
                let word = cursor
                    .read_u64_le()
                    .map_err(|_| Error::insufficient_data("bits"))?;
                words.push(word);
            }
        }

        check_shape(&words, num_hashes).map_err(Error::deserial)?;
        tracing::debug!(
            m = num_words as u64 * 64,
            k = num_hashes,
            is_empty,
            "decoded bloom filter frame"
        );
        Ok(Self::from_parts(
            BitStore::from_words(words),
            num_hashes,
            Box::new(Murmur128Mitz64),
        ))
    }

    fn indexes(&self, data: &[u8]) -> Vec<u64> {
        self.strategy.indexes(data, self.m(), self.num_hashes)
    }

    fn set_bit(&mut self, index: u64) {
        if self.bits.set(index) {
            self.num_bits_set += 1;
        }
    }
}

fn check_shape(words: &[u64], num_hashes: u32) -> Result<(), &'static str> {
    if words.is_empty() {
        return Err("bit words must not be empty");
    }
    if words.len() as u64 > MAX_NUM_WORDS {
        return Err("bit words exceed the maximum filter size");
    }
    if num_hashes == 0 {
        return Err("num_hashes must be at least 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_might_contain() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        assert!(!filter.might_contain("A"));

        filter.put("A").put("B");
        assert!(filter.might_contain("A"));
        assert!(filter.might_contain("B"));
        assert!(!filter.might_contain("C"));
        assert!(!filter.might_contain("D"));
    }

    #[test]
    fn test_put_sets_reference_bits() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.put("A").put("B");
        // "A" -> [954, 817, 680, 415, 278, 13, 836], "B" -> [742, 394, 46, 786, 438, 90, 702]
        assert_eq!(filter.bits_used(), 14);
        assert_eq!(
            filter.serialize().bits,
            vec![
                70368744185856,
                67108864,
                0,
                0,
                4194304,
                0,
                18014400656966656,
                0,
                0,
                0,
                4611687117939015680,
                274877906944,
                562949953683456,
                16,
                288230376151711744,
            ]
        );
    }

    #[test]
    fn test_contains_and_put() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        assert!(!filter.contains_and_put([1u8, 2, 3]));
        assert!(filter.contains_and_put([1u8, 2, 3]));
        assert!(filter.might_contain([1u8, 2, 3]));
    }

    #[test]
    fn test_statistics() {
        let mut filter = BloomFilter::from_words(vec![0; 16], 5).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.load_factor(), 0.0);
        assert_eq!(filter.estimated_fpp(), 0.0);

        filter.put("test");
        assert!(filter.bits_used() >= 1 && filter.bits_used() <= 5);
        assert!(filter.load_factor() > 0.0);
        assert!(filter.estimated_fpp() > 0.0);
    }

    #[test]
    fn test_from_words_counts_existing_bits() {
        let filter = BloomFilter::from_words(vec![0b1011, 1 << 63], 3).unwrap();
        assert_eq!(filter.m(), 128);
        assert_eq!(filter.k(), 3);
        assert_eq!(filter.bits_used(), 4);
    }

    #[test]
    fn test_from_words_rejects_bad_shape() {
        let err = BloomFilter::from_words(vec![], 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = BloomFilter::from_words(vec![0], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_union() {
        let mut f1 = BloomFilter::new(100, 0.01).unwrap();
        let mut f2 = BloomFilter::new(100, 0.01).unwrap();
        f1.put("a");
        f2.put("b");

        f1.union(&f2).unwrap();
        assert!(f1.might_contain("a"));
        assert!(f1.might_contain("b"));
        assert_eq!(f1.bits_used(), f1.bits.count_ones());
    }

    #[test]
    fn test_union_rejects_incompatible() {
        let mut f1 = BloomFilter::new(100, 0.01).unwrap();
        let f2 = BloomFilter::new(1000, 0.01).unwrap();
        let err = f1.union(&f2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_records() {
        let cases = [
            BloomFilterRecord { m: 0, k: 7, bits: vec![] },
            BloomFilterRecord { m: 64, k: 0, bits: vec![0] },
            BloomFilterRecord { m: 100, k: 7, bits: vec![0, 0] },
        ];
        for record in cases {
            let err = BloomFilter::deserialize(record).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidData);
        }
    }

    #[test]
    fn test_bytes_layout_of_empty_filter() {
        let filter = BloomFilter::from_words(vec![0; 2], 3).unwrap();
        let bytes = filter.to_bytes();
        assert_eq!(
            bytes,
            vec![2, 1, 21, EMPTY_FLAG_MASK, 3, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0]
        );

        let restored = BloomFilter::from_bytes(&bytes).unwrap();
        assert_eq!(restored.m(), 128);
        assert_eq!(restored.k(), 3);
        assert!(restored.is_empty());
    }

    #[test]
    fn test_from_bytes_rejects_oversized_empty_frame() {
        let mut bytes = BloomFilter::from_words(vec![0], 1).unwrap().to_bytes();
        bytes[8..16].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = BloomFilter::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_from_bytes_rejects_empty_frame_beyond_max_size() {
        let mut bytes = vec![2, 1, 21, EMPTY_FLAG_MASK, 1, 0, 0, 0];
        bytes.extend_from_slice(&(1u64 << 32).to_le_bytes());
        let err = BloomFilter::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(err.message(), "word count exceeds the supported maximum");

        bytes[8..16].copy_from_slice(&(MAX_NUM_WORDS + 1).to_le_bytes());
        let err = BloomFilter::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_from_bytes_rejects_truncated_payload() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.put("a");
        let bytes = filter.to_bytes();

        let err = BloomFilter::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        let err = BloomFilter::from_bytes(&bytes[..3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
