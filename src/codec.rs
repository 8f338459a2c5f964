//! # 编码与解码流水线
//!
//! 编码：计算正方形画布 → 写出头部 → 逐行逐像素写入 (加密 + 映射后的) 载荷字节，
//! 载荷耗尽后写入渐变填充像素 → 每行末尾写入零填充。
//!
//! 解码：解析头部 → 从保留字段还原载荷长度 → 按同样的行列顺序读取像素，
//! 取出该位置的权威通道并解密，写满载荷长度后立即停止。
//!
//! 像素行按从上到下的顺序写入，而非 BMP 惯用的自下而上；解码器按相同顺序读取。

use crate::bmp::BmpHeader;
use crate::cipher::EncryptionKey;
use crate::constants::BYTES_PER_PIXEL;
use crate::pixel::Pixel;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};

/// 一次解码的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub header: BmpHeader,
    /// 实际写出的字节数。画布小于头部记录的长度时可能少于 `header.payload_len()`。
    pub bytes_written: u64,
}

/// 把 `payload` 中的 `payload_len` 个字节编码为 BMP 图像写入 `output`。
///
/// # Errors
///
/// * 载荷过大，无法用 BMP 头部描述 (`ErrorKind::InvalidInput`)。
/// * `payload` 在读满 `payload_len` 字节之前结束 (`ErrorKind::UnexpectedEof`)。
/// * 任何底层读写错误。
pub fn encode<R: Read, W: Write>(
    payload: R,
    payload_len: u64,
    key: &EncryptionKey,
    output: W,
) -> Result<BmpHeader, io::Error> {
    let header = BmpHeader::for_payload(payload_len)?;
    let geometry = header.geometry();

    let mut writer = BufWriter::new(output);
    header.write_to(&mut writer)?;

    let mut bytes = BufReader::new(payload).take(payload_len).bytes();
    let padding = vec![0u8; geometry.padding()];
    let mut position = 0u64;

    for y in 0..geometry.height {
        for x in 0..geometry.width {
            let pixel = match bytes.next() {
                Some(byte) => {
                    let pixel = Pixel::from_byte(key.apply(byte?, position), position);
                    position += 1;
                    pixel
                }
                None => Pixel::filler(x, y, geometry.width, geometry.height),
            };
            writer.write_all(&pixel.to_bytes())?;
        }
        writer.write_all(&padding)?;
    }

    if position != payload_len {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("The payload ended after {position} of {payload_len} bytes."),
        ));
    }

    writer.flush()?;
    Ok(header)
}

/// 从 `image` 中解码载荷并写入 `output`。
///
/// `strict` 为 `true` 时先用 [`BmpHeader::validate`] 校验头部；否则按原样接受头部，
/// 只依赖其中的宽、高和载荷长度。
///
/// # Errors
///
/// * 头部或像素数据被截断 (`ErrorKind::UnexpectedEof`)。
/// * 严格模式下头部校验失败 (`ErrorKind::InvalidData`)。
/// * 任何底层读写错误。
pub fn decode<R: Read, W: Write>(
    image: R,
    key: &EncryptionKey,
    output: W,
    strict: bool,
) -> Result<Decoded, io::Error> {
    let mut reader = BufReader::new(image);
    let header = BmpHeader::read_from(&mut reader)?;
    if strict {
        header.validate()?;
    }

    let geometry = header.geometry();
    let payload_len = header.payload_len();
    let padding = geometry.padding() as u64;

    let mut writer = BufWriter::new(output);
    let mut pixel = [0u8; BYTES_PER_PIXEL];
    let mut position = 0u64;

    for _ in 0..geometry.height {
        if position >= payload_len {
            break;
        }
        for _ in 0..geometry.width {
            if position >= payload_len {
                break;
            }
            reader.read_exact(&mut pixel)?;
            let byte = Pixel::from_bytes(pixel).recover_byte(position);
            writer.write_all(&[key.apply(byte, position)])?;
            position += 1;
        }
        // 无论该行是否读完，都只跳过一行的填充
        io::copy(&mut reader.by_ref().take(padding), &mut io::sink())?;
    }

    writer.flush()?;
    Ok(Decoded {
        header,
        bytes_written: position,
    })
}

/// 把内存中的载荷编码为完整的 BMP 文件字节。
pub fn encode_to_vec(payload: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, io::Error> {
    let mut image = Vec::new();
    encode(payload, payload.len() as u64, key, &mut image)?;
    Ok(image)
}

/// 以宽松模式解码内存中的 BMP 文件字节。
pub fn decode_to_vec(image: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, io::Error> {
    let mut payload = Vec::new();
    decode(image, key, &mut payload, false)?;
    Ok(payload)
}
