//! # 字节与像素映射模块
//!
//! 每个数据字节映射为一个 3 通道像素。位置对 3 取模决定哪个通道原样保存该字节，
//! 另外两个通道写入 `byte / 2` 和 `byte / 3`，仅用于视觉效果，解码时丢弃。

use crate::constants::BYTES_PER_PIXEL;

/// 24 位像素，按 red、green、blue 的顺序写入文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Pixel {
    /// 把位于 `position` 的字节映射为像素。
    pub fn from_byte(byte: u8, position: u64) -> Self {
        let (half, third) = (byte / 2, byte / 3);
        match position % 3 {
            0 => Self {
                red: byte,
                green: third,
                blue: half,
            },
            1 => Self {
                red: half,
                green: byte,
                blue: third,
            },
            _ => Self {
                red: third,
                green: half,
                blue: byte,
            },
        }
    }

    /// 读取 `position` 对应的权威通道，是 [`Pixel::from_byte`] 的逆操作。
    pub fn recover_byte(&self, position: u64) -> u8 {
        match position % 3 {
            0 => self.red,
            1 => self.green,
            _ => self.blue,
        }
    }

    /// 载荷耗尽后填充画布的渐变像素，解码时从不读取。
    ///
    /// `width` 和 `height` 必须大于零。
    pub fn filler(x: u32, y: u32, width: u32, height: u32) -> Self {
        let (x, y, width, height) = (x as u64, y as u64, width as u64, height as u64);
        Self {
            red: (x * 255 / width) as u8,
            green: (y * 255 / height) as u8,
            blue: ((x + y) * 255 / (width + height)) as u8,
        }
    }

    pub fn to_bytes(self) -> [u8; BYTES_PER_PIXEL] {
        [self.red, self.green, self.blue]
    }

    pub fn from_bytes(bytes: [u8; BYTES_PER_PIXEL]) -> Self {
        let [red, green, blue] = bytes;
        Self { red, green, blue }
    }
}
