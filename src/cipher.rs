//! # 位置异或加密模块
//!
//! 使用重复密钥对每个字节做异或，密钥字节由该字节在载荷中的绝对位置选择。
//! 同一位置、同一密钥再做一次异或即可还原，因此加密与解密是同一个操作。

use std::io::{self, ErrorKind};

/// 加密密钥：一个非空的原始字节序列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    bytes: Vec<u8>,
}

impl EncryptionKey {
    /// 从原始字节创建密钥。
    ///
    /// # Errors
    ///
    /// 如果 `bytes` 为空，返回 `ErrorKind::InvalidInput`。
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, io::Error> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "The encryption key must not be empty.",
            ));
        }
        Ok(Self { bytes })
    }

    /// 将 `byte` 与位置 `position` 对应的密钥字节异或。
    pub fn apply(&self, byte: u8, position: u64) -> u8 {
        let index = (position % self.bytes.len() as u64) as usize;
        byte ^ self.bytes[index]
    }
}

impl TryFrom<&str> for EncryptionKey {
    type Error = io::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.as_bytes())
    }
}
