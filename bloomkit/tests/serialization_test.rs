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

use bloomkit::bloom::BloomFilter;
use bloomkit::bloom::BloomFilterRecord;
use bloomkit::error::ErrorKind;
use googletest::assert_that;
use googletest::prelude::eq;
use insta::assert_snapshot;

fn filled_filter() -> BloomFilter {
    let mut filter = BloomFilter::new(100, 0.01).unwrap();
    filter.put("A").put("B");
    filter
}

const PROBES: [&str; 6] = ["A", "B", "C", "D", "this_is_a_test_string", ""];

#[test]
fn test_json_shape() {
    let mut filter = BloomFilter::from_words(vec![0; 2], 1).unwrap();
    filter.put("A");
    // with k == 1, "A" lands on bit 122
    assert_snapshot!(filter.to_json().unwrap(), @r#"{"m":128,"k":1,"bits":[0,288230376151711744]}"#);
}

#[test]
fn test_json_round_trip() {
    let filter = filled_filter();
    let json = filter.to_json().unwrap();
    let restored = BloomFilter::from_json(&json).unwrap();

    assert_that!(restored.m(), eq(960));
    assert_that!(restored.k(), eq(7));
    assert_eq!(restored.serialize(), filter.serialize());
    for probe in PROBES {
        assert_eq!(
            restored.might_contain(probe),
            filter.might_contain(probe),
            "probe: {probe:?}"
        );
    }
}

#[test]
fn test_record_to_words_round_trip() {
    let filter = filled_filter();
    let record: BloomFilterRecord =
        serde_json::from_str(&serde_json::to_string(&filter.serialize()).unwrap()).unwrap();

    let restored = BloomFilter::from_words(record.bits, record.k).unwrap();
    assert_eq!(restored.m(), 960);
    assert!(restored.might_contain("A"));
    assert!(restored.might_contain("B"));
    assert!(!restored.might_contain("C"));
}

#[test]
fn test_bytes_round_trip() {
    let filter = filled_filter();
    let bytes = filter.to_bytes();
    assert_eq!(bytes.len(), 16 + 15 * 8);

    let restored = BloomFilter::from_bytes(&bytes).unwrap();
    assert_eq!(restored.serialize(), filter.serialize());
    assert_eq!(restored.bits_used(), 14);
    for probe in PROBES {
        assert_eq!(restored.might_contain(probe), filter.might_contain(probe));
    }
}

#[test]
fn test_malformed_json() {
    for json in [
        "",
        "[]",
        r#"{"m":64,"k":7}"#,
        r#"{"m":64,"k":7,"bits":"0"}"#,
        r#"{"m":64,"k":-7,"bits":[0]}"#,
    ] {
        let err = BloomFilter::from_json(json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData, "json: {json}");
    }
}

#[test]
fn test_inconsistent_json() {
    // stored m disagrees with the two-word payload
    let err = BloomFilter::from_json(r#"{"m":100,"k":3,"bits":[0,0]}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert_snapshot!(
        err,
        @"InvalidData, context: { m: 100, payload_bits: 128 } => stored m disagrees with bit payload"
    );

    let err = BloomFilter::from_json(r#"{"m":0,"k":3,"bits":[]}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn test_bytes_from_other_family() {
    let mut bytes = filled_filter().to_bytes();
    bytes[2] = 18;
    let err = BloomFilter::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert_snapshot!(err, @"InvalidData => invalid family: expected 21 (BLOOMFILTER), got 18");

    let mut bytes = filled_filter().to_bytes();
    bytes[1] = 9;
    let err = BloomFilter::from_bytes(&bytes).unwrap_err();
    assert_snapshot!(err, @"InvalidData => unsupported serial version: expected 1, got 9");
}
