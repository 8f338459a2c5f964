//! # BMP 容器模块
//!
//! 负责 14 字节文件头和 40 字节信息头的构造与解析，以及正方形画布的几何计算。
//!
//! 文件头中两个按惯例保留的 16 位字段被用来保存载荷的真实长度 (低 16 位与高 16 位)，
//! 因为仅凭像素数量无法区分真实数据与填充像素。

use crate::constants::{
    BITS_PER_PIXEL, BMP_MAGIC, BYTES_PER_PIXEL, FILE_HEADER_SIZE, INFO_HEADER_SIZE,
    PIXEL_DATA_OFFSET,
};
use std::io::{self, ErrorKind, Read, Write};

/// 画布几何：宽、高及由宽度推导出的行填充。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// 为 `payload_len` 字节的载荷计算正方形画布，边长为 `floor(sqrt(len)) + 1`。
    pub fn for_payload(payload_len: u32) -> Self {
        let side = (payload_len as u64).isqrt() as u32 + 1;
        Self {
            width: side,
            height: side,
        }
    }

    /// 每行像素数据之后追加的零字节数量。
    pub fn padding(&self) -> usize {
        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        (4 - row_bytes % 4) % 4
    }

    /// 含填充的行字节数，总是 4 的倍数。
    pub fn row_stride(&self) -> u64 {
        self.width as u64 * BYTES_PER_PIXEL as u64 + self.padding() as u64
    }

    pub fn image_size(&self) -> u64 {
        self.row_stride() * self.height as u64
    }

    /// 画布可容纳的像素 (即载荷字节) 数量。
    pub fn capacity(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// BITMAPFILEHEADER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u16,
    pub file_size: u32,
    /// 载荷长度的低 16 位 (原 `bfReserved1`)。
    pub payload_len_low: u16,
    /// 载荷长度的高 16 位 (原 `bfReserved2`)。
    pub payload_len_high: u16,
    pub pixel_offset: u32,
}

impl FileHeader {
    fn to_bytes(self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.magic.to_le_bytes());
        buf[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        buf[6..8].copy_from_slice(&self.payload_len_low.to_le_bytes());
        buf[8..10].copy_from_slice(&self.payload_len_high.to_le_bytes());
        buf[10..14].copy_from_slice(&self.pixel_offset.to_le_bytes());
        buf
    }

    fn from_bytes(buf: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            magic: read_u16(buf, 0),
            file_size: read_u32(buf, 2),
            payload_len_low: read_u16(buf, 6),
            payload_len_high: read_u16(buf, 8),
            pixel_offset: read_u32(buf, 10),
        }
    }
}

/// BITMAPINFOHEADER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    fn to_bytes(self) -> [u8; INFO_HEADER_SIZE] {
        let mut buf = [0u8; INFO_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        buf[4..8].copy_from_slice(&self.width.to_le_bytes());
        buf[8..12].copy_from_slice(&self.height.to_le_bytes());
        buf[12..14].copy_from_slice(&self.planes.to_le_bytes());
        buf[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        buf[16..20].copy_from_slice(&self.compression.to_le_bytes());
        buf[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        buf[24..28].copy_from_slice(&self.x_pels_per_meter.to_le_bytes());
        buf[28..32].copy_from_slice(&self.y_pels_per_meter.to_le_bytes());
        buf[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        buf[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
        buf
    }

    fn from_bytes(buf: &[u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            header_size: read_u32(buf, 0),
            width: read_u32(buf, 4) as i32,
            height: read_u32(buf, 8) as i32,
            planes: read_u16(buf, 12),
            bit_count: read_u16(buf, 14),
            compression: read_u32(buf, 16),
            image_size: read_u32(buf, 20),
            x_pels_per_meter: read_u32(buf, 24) as i32,
            y_pels_per_meter: read_u32(buf, 28) as i32,
            colors_used: read_u32(buf, 32),
            colors_important: read_u32(buf, 36),
        }
    }
}

/// 文件头与信息头的组合。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file: FileHeader,
    pub info: InfoHeader,
}

impl BmpHeader {
    /// 为 `payload_len` 字节的载荷合成头部。
    ///
    /// # Errors
    ///
    /// 如果载荷长度超出 32 位，或画布大小无法写入 32 位的文件大小字段，
    /// 返回 `ErrorKind::InvalidInput`。
    pub fn for_payload(payload_len: u64) -> Result<Self, io::Error> {
        let payload_len = u32::try_from(payload_len).map_err(|_| {
            io::Error::new(
                ErrorKind::InvalidInput,
                "The payload is larger than the 32-bit length the header can carry.",
            )
        })?;

        let geometry = Geometry::for_payload(payload_len);
        let image_size = geometry.image_size();
        let (Ok(image_size), Ok(file_size)) = (
            u32::try_from(image_size),
            u32::try_from(image_size + PIXEL_DATA_OFFSET as u64),
        ) else {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "The payload needs a canvas larger than a BMP file can describe.",
            ));
        };

        Ok(Self {
            file: FileHeader {
                magic: BMP_MAGIC,
                file_size,
                payload_len_low: (payload_len & 0xFFFF) as u16,
                payload_len_high: ((payload_len >> 16) & 0xFFFF) as u16,
                pixel_offset: PIXEL_DATA_OFFSET,
            },
            info: InfoHeader {
                header_size: INFO_HEADER_SIZE as u32,
                width: geometry.width as i32,
                height: geometry.height as i32,
                planes: 1,
                bit_count: BITS_PER_PIXEL,
                compression: 0,
                image_size,
                x_pels_per_meter: 0,
                y_pels_per_meter: 0,
                colors_used: 0,
                colors_important: 0,
            },
        })
    }

    /// 从两个保留字段中还原载荷长度。
    pub fn payload_len(&self) -> u64 {
        self.file.payload_len_low as u64 | ((self.file.payload_len_high as u64) << 16)
    }

    /// 头部描述的画布几何，非正的宽或高视为 0。
    pub fn geometry(&self) -> Geometry {
        Geometry {
            width: self.info.width.max(0) as u32,
            height: self.info.height.max(0) as u32,
        }
    }

    /// 依次写出文件头和信息头。
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), io::Error> {
        writer.write_all(&self.file.to_bytes())?;
        writer.write_all(&self.info.to_bytes())
    }

    /// 读取恰好 14 + 40 字节并按固定布局解析，不做任何校验。
    ///
    /// # Errors
    ///
    /// 数据不足 54 字节时返回 `ErrorKind::UnexpectedEof`。
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, io::Error> {
        let mut file = [0u8; FILE_HEADER_SIZE];
        reader.read_exact(&mut file)?;
        let mut info = [0u8; INFO_HEADER_SIZE];
        reader.read_exact(&mut info)?;

        Ok(Self {
            file: FileHeader::from_bytes(&file),
            info: InfoHeader::from_bytes(&info),
        })
    }

    /// 严格模式下的头部校验。
    ///
    /// # Errors
    ///
    /// 任何字段不符合 24 位、无压缩、54 字节偏移的 BMP，或画布无法容纳记录的载荷长度时，
    /// 返回 `ErrorKind::InvalidData`。
    pub fn validate(&self) -> Result<(), io::Error> {
        let invalid =
            |msg: String| -> Result<(), io::Error> { Err(io::Error::new(ErrorKind::InvalidData, msg)) };

        if self.file.magic != BMP_MAGIC {
            return invalid(format!("Missing BMP signature (found {:#06x}).", self.file.magic));
        }
        if self.file.pixel_offset != PIXEL_DATA_OFFSET {
            return invalid(format!(
                "Unexpected pixel data offset {}, expected {}.",
                self.file.pixel_offset, PIXEL_DATA_OFFSET
            ));
        }
        if self.info.header_size as usize != INFO_HEADER_SIZE {
            return invalid(format!(
                "Unsupported info header size {}, expected {}.",
                self.info.header_size, INFO_HEADER_SIZE
            ));
        }
        if self.info.planes != 1 {
            return invalid(format!("Unsupported plane count {}.", self.info.planes));
        }
        if self.info.bit_count != BITS_PER_PIXEL {
            return invalid(format!(
                "Unsupported bit depth {}, only 24-bit images are supported.",
                self.info.bit_count
            ));
        }
        if self.info.compression != 0 {
            return invalid(format!(
                "Unsupported compression method {}.",
                self.info.compression
            ));
        }
        if self.info.width <= 0 || self.info.height <= 0 {
            return invalid(format!(
                "Invalid image dimensions {}x{}.",
                self.info.width, self.info.height
            ));
        }

        let capacity = self.geometry().capacity();
        if self.payload_len() > capacity {
            return invalid(format!(
                "Recorded payload length {} exceeds the canvas capacity {}.",
                self.payload_len(),
                capacity
            ));
        }

        Ok(())
    }
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}
