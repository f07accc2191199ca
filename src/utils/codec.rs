//! Base64 编解码 (Base64 Codec)
//!
//! 外部传入的负载可能是 URL-safe 字母表或缺少补齐，解码前统一修复。

use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::core::error::Result;

/// 宽松解码引擎：容忍末尾冗余比特与任意补齐形态
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub fn decode(input: &str) -> Result<Vec<u8>> {
    Ok(LENIENT.decode(input)?)
}

/// 修复 URL-safe 字符与缺失的补齐
pub fn repair_padding(input: &str) -> String {
    let mut normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    let rem = normalized.len() % 4;
    if rem != 0 {
        normalized.extend(std::iter::repeat_n('=', 4 - rem));
    }
    normalized
}

/// 修复后解码
pub fn decode_repaired(input: &str) -> Result<Vec<u8>> {
    decode(&repair_padding(input))
}
