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
use super::estimate::estimate_parameters;
use super::estimate::pad_to_word;
use super::estimate::MAX_NUM_BITS;
use super::estimate::MIN_NUM_BITS;
use super::BloomFilter;
use super::HashStrategy;
use super::Murmur128Mitz64;
use crate::error::Error;

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Accuracy { max_items: u64, fpp: f64 },
    Size { num_bits: u64, num_hashes: u32 },
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two sizing modes:
/// - [`with_accuracy()`](Self::with_accuracy): expected items and false positive rate
/// - [`with_size()`](Self::with_size): explicit bit count and hash count
///
/// Either way the bit count is padded up to a multiple of 64 before the bits are allocated.
#[derive(Debug)]
pub struct BloomFilterBuilder {
    sizing: Sizing,
    strategy: Box<dyn HashStrategy>,
}

impl BloomFilterBuilder {
    /// Sizes the filter for `max_items` insertions at false positive probability `fpp`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
    /// assert_eq!(filter.m(), 9600);
    /// assert_eq!(filter.k(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Accuracy { max_items, fpp },
            strategy: Box::new(Murmur128Mitz64),
        }
    }

    /// Sizes the filter explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(1000, 5).build().unwrap();
    /// assert_eq!(filter.m(), 1024);
    /// assert_eq!(filter.k(), 5);
    /// ```
    pub fn with_size(num_bits: u64, num_hashes: u32) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Size {
                num_bits,
                num_hashes,
            },
            strategy: Box::new(Murmur128Mitz64),
        }
    }

    /// Replaces the default [`Murmur128Mitz64`] index strategy.
    pub fn strategy(mut self, strategy: impl HashStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Builds an empty filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if the
    /// accuracy parameters are out of range, or if an explicit size has zero hashes or a bit count
    /// between [`MIN_NUM_BITS`] and [`MAX_NUM_BITS`].
    pub fn build(self) -> Result<BloomFilter, Error> {
        let (num_bits, num_hashes) = match self.sizing {
            Sizing::Accuracy { max_items, fpp } => estimate_parameters(max_items, fpp)?,
            Sizing::Size {
                num_bits,
                num_hashes,
            } => {
                if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits) {
                    return Err(Error::invalid_argument(format!(
                        "num_bits must be in [{MIN_NUM_BITS}, {MAX_NUM_BITS}], got {num_bits}"
                    )));
                }
                if num_hashes == 0 {
                    return Err(Error::invalid_argument("num_hashes must be at least 1"));
                }
                (num_bits, num_hashes)
            }
        };

        let m = pad_to_word(num_bits);
        tracing::debug!(requested_bits = num_bits, m, k = num_hashes, "sized bloom filter");
        Ok(BloomFilter::from_parts(
            BitStore::new(m),
            num_hashes,
            self.strategy,
        ))
    }
}
