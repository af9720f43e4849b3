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

//! Conversion of `bytes` and `fixed` values to and from JSON strings.
//!
//! Avro JSON carries binary data as a string where each byte is the code point of one character,
//! i.e. the bytes are decoded as ISO-8859-1. Every byte maps to exactly one character in
//! `U+0000..=U+00FF`, so the mapping is a bijection between octet sequences and strings drawn
//! from that range.

use crate::AvroResult;
use crate::error::Details;

/// Returns the string whose characters are the code points of `bytes`.
///
/// ```
/// assert_eq!(avro_json::bytes::bytes_to_text(&[0x41, 0xfb]), "A\u{fb}");
/// ```
pub fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Returns the bytes whose values are the code points of the characters of `text`.
///
/// # Errors
/// [`Details::BytesToLatin1`] when `text` contains a character beyond `U+00FF`, which no single
/// byte can represent.
pub fn text_to_bytes(text: &str) -> AvroResult<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(c).map_err(|_| Details::BytesToLatin1(c).into()))
        .collect()
}
