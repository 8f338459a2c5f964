//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! `encode` 与 `decode` 分别可以用短标志 `-i` 与 `-o` 调用，
//! 与 `prog -i <file> <key>` / `prog -o <file> <key> <outputFile>` 的调用方式兼容。

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 把任意文件转换为可查看的 24 位 BMP 图像 (并可还原)，内容经过重复密钥异或混淆。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "把任意文件转换为可查看的 24 位 BMP 图像 (并可还原)，内容经过重复密钥异或混淆。\n注意：异或混淆不是安全的加密。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (编码)、decode (解码) 和 inspect (查看)。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 把文件编码为 BMP 图像。
    #[command(short_flag = 'i')]
    Encode(EncodeArgs),

    /// 从 BMP 图像中还原原始文件。
    #[command(short_flag = 'o')]
    Decode(DecodeArgs),

    /// 显示 BMP 图像的画布几何和记录的载荷长度。
    Inspect(InspectArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 要编码的输入文件路径。
    pub file: PathBuf,

    /// 异或密钥，按原始字节使用，不能为空。
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub key: String,

    /// 输出图像路径，默认为当前目录下的 `encoded.bmp` (每次运行都会覆盖)。
    /// 显式指定的路径已存在时需要 `--force`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 由 encode 生成的图像文件路径。
    pub image: PathBuf,

    /// 编码时使用的异或密钥。
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub key: String,

    /// 还原文件的保存路径。
    pub output: PathBuf,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 解码前校验 BMP 头部 (魔数、头部大小、位深等)。
    #[arg(short, long)]
    pub strict: bool,
}

/// 'inspect' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// 要查看的图像文件路径。
    pub image: PathBuf,
}
