//! # bmpwrap 库
//!
//! 本库包含把任意文件编码为 BMP 图像并还原的核心逻辑。

// 声明库包含的所有模块。

pub mod bmp;
pub mod cipher;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod handler;
pub mod pixel;
