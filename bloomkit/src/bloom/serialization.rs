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

use serde::Deserialize;
use serde::Serialize;

pub(super) const SERIAL_VERSION: u8 = 1;
pub(super) const EMPTY_FLAG_MASK: u8 = 1 << 2;
pub(super) const HEADER_BYTES: usize = 16;

/// The portable form of a [`BloomFilter`](super::BloomFilter).
///
/// Field names are fixed: `{"m": .., "k": .., "bits": [..]}`. `bits` holds the packed bit array,
/// bit `i` at position `i % 64` of word `i / 64`. The index strategy is not recorded; a filter
/// built with a non-default strategy must have it restored after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomFilterRecord {
    /// Bit-array capacity. Always `bits.len() * 64` for a well-formed record.
    pub m: u64,
    /// Number of hash-derived indexes per item.
    pub k: u32,
    /// Packed bit words.
    pub bits: Vec<u64>,
}
