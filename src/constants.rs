/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const FILE_HEADER_SIZE: usize = 14;

/// BMP 信息头 (BITMAPINFOHEADER) 的大小 (字节)。
pub const INFO_HEADER_SIZE: usize = 40;

/// 两个头部合计的大小，也是像素数据的起始偏移。
pub const PIXEL_DATA_OFFSET: u32 = 54;

/// BMP 魔数 "BM"，按小端读取为 `0x4D42`。
pub const BMP_MAGIC: u16 = 0x4D42;

/// 每个像素占用 3 个字节 (24 位，无 alpha 通道)。
pub const BYTES_PER_PIXEL: usize = 3;

pub const BITS_PER_PIXEL: u16 = 24;

/// 编码时未指定输出路径所使用的文件名。
pub const DEFAULT_ENCODED_NAME: &str = "encoded.bmp";
