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

use std::f64::consts::LN_2;

use crate::codec::family::Family;
use crate::error::Error;

/// Smallest filter the estimator produces, in bits (padded to 64 on construction).
pub const MIN_NUM_BITS: u64 = 1;
/// Largest supported filter, in bits. Always a multiple of 64.
pub const MAX_NUM_BITS: u64 = (i32::MAX as u64 - Family::BLOOMFILTER.pre_longs as u64) * 64;
pub(crate) const MAX_NUM_WORDS: u64 = MAX_NUM_BITS / 64;

/// Estimates the bit count `m` and hash count `k` for `max_items` insertions at a target false
/// positive probability `fpp`.
///
/// - `m = trunc(-n * ln(p) / ln(2)^2)`, clamped between [`MIN_NUM_BITS`] and [`MAX_NUM_BITS`]
/// - `k = max(1, floor(0.5 + m / n * ln(2)))`
///
/// The returned `m` is not yet padded; see [`pad_to_word`].
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
/// `max_items` is 0 or `fpp` is not strictly between 0 and 1.
///
/// # Examples
///
/// ```
/// # use bloomkit::bloom::estimate_parameters;
/// let (m, k) = estimate_parameters(1000, 0.01).unwrap();
/// assert_eq!(m, 9585);
/// assert_eq!(k, 7);
/// ```
pub fn estimate_parameters(max_items: u64, fpp: f64) -> Result<(u64, u32), Error> {
    if max_items == 0 {
        return Err(Error::invalid_argument("max_items must be greater than 0"));
    }
    if !(fpp > 0.0 && fpp < 1.0) {
        return Err(Error::invalid_argument(format!(
            "fpp must be in (0, 1), got {fpp}"
        )));
    }

    let n = max_items as f64;
    let m = ((-n * fpp.ln() / (LN_2 * LN_2)) as u64).clamp(MIN_NUM_BITS, MAX_NUM_BITS);
    let k = (0.5 + m as f64 / n * LN_2).floor().max(1.0) as u32;
    Ok((m, k))
}

/// Rounds `num_bits` up to the next multiple of 64. Aligned values are returned unchanged.
///
/// Values within 63 of `u64::MAX` saturate to the largest multiple of 64.
pub fn pad_to_word(num_bits: u64) -> u64 {
    num_bits
        .checked_next_multiple_of(64)
        .unwrap_or(u64::MAX & !63)
}
