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

//! Classic fixed-size Bloom filter with double hashing.
//!
//! A Bloom filter answers set-membership queries with either "definitely absent" or "possibly
//! present". It never produces false negatives; the false positive rate is chosen up front.
//!
//! # Properties
//!
//! - **No false negatives**: after `put(x)`, `might_contain(x)` is `true` for good
//! - **Possible false positives**: `might_contain` may return `true` for items never put
//! - **Fixed size**: capacity is decided at construction and bits are never cleared
//!
//! # Usage
//!
//! ```rust
//! use bloomkit::bloom::BloomFilter;
//!
//! // 1000 items at a 1% false positive rate: 9600 bits, 7 indexes per item
//! let mut filter = BloomFilter::new(1000, 0.01).unwrap();
//! assert_eq!((filter.m(), filter.k()), (9600, 7));
//!
//! filter.put("apple").put("banana");
//! assert!(filter.might_contain("apple"));
//! assert!(!filter.might_contain("grape"));
//! ```
//!
//! # Sizing
//!
//! [`estimate_parameters`] computes `m = -n ln(p) / ln(2)^2` and `k = round(m / n * ln(2))`.
//! The filter then pads `m` up to a multiple of 64 so the bits export as whole `u64` words.
//! [`BloomFilterBuilder`] exposes the same sizing plus explicit `(m, k)` and a custom strategy.
//!
//! # Persistence
//!
//! [`BloomFilter::serialize`] produces a [`BloomFilterRecord`] (`{"m", "k", "bits"}` in JSON);
//! [`BloomFilter::to_bytes`] produces a compact little-endian frame. Neither records the
//! [`HashStrategy`]; decoding always assumes [`Murmur128Mitz64`], so a filter built with another
//! strategy must have it restored with [`BloomFilter::set_strategy`].
//!
//! ```rust
//! use bloomkit::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::new(100, 0.01).unwrap();
//! filter.put("A");
//!
//! let record = filter.serialize();
//! let restored = BloomFilter::from_words(record.bits, record.k).unwrap();
//! assert!(restored.might_contain("A"));
//! ```
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"

mod bits;
mod builder;
mod estimate;
mod serialization;
mod sketch;
mod strategy;

pub use self::builder::BloomFilterBuilder;
pub use self::estimate::estimate_parameters;
pub use self::estimate::pad_to_word;
pub use self::estimate::MAX_NUM_BITS;
pub use self::estimate::MIN_NUM_BITS;
pub use self::serialization::BloomFilterRecord;
pub use self::sketch::BloomFilter;
pub use self::strategy::HashStrategy;
pub use self::strategy::Murmur128Mitz64;
