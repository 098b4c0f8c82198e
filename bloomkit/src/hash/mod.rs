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

//! Hash primitives used to derive bit indexes.

mod murmurhash;

pub use self::murmurhash::murmur3_x64_128;

/// Seed used by the reference index strategy.
///
/// Filters only agree on the meaning of their bits when they hash with the same seed, so this is
/// part of the persisted format even though it is never written out.
pub const MURMUR3_SEED: u64 = 0;
