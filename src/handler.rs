//! # 命令处理逻辑模块
//!
//! 包含处理 `encode`、`decode` 和 `inspect` 子命令的高级业务逻辑。
//! 本模块负责打开文件、调用核心编解码流水线以及向用户报告结果。

use crate::bmp::BmpHeader;
use crate::cipher::EncryptionKey;
use crate::cli::{DecodeArgs, EncodeArgs, InspectArgs};
use crate::codec::{decode, encode};
use crate::constants::DEFAULT_ENCODED_NAME;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// 打开输出文件前的检查：不覆盖输入文件本身；`guard_existing` 时，
/// 不覆盖已存在的文件 (除非 `force`)。
fn ensure_output_allowed(
    input: &Path,
    output: &Path,
    guard_existing: bool,
    force: bool,
) -> Result<()> {
    anyhow::ensure!(
        input != output,
        "The output path must differ from the input path: {}",
        output.to_string_lossy().red().bold()
    );
    anyhow::ensure!(
        !guard_existing || force || !output.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        output.to_string_lossy().red().bold()
    );
    Ok(())
}

fn parse_key(key: &str) -> Result<EncryptionKey> {
    EncryptionKey::try_from(key).context("A non-empty key is required.")
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).with_context(|| {
        format!(
            "Unable to open input file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

fn create_output(path: &Path) -> Result<File> {
    File::create(path).with_context(|| {
        format!(
            "Unable to create output file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 负责打开输入文件并测量其大小、创建输出图像，然后调用编码流水线写出头部和像素。
///
/// # Arguments
///
/// * `args` - 包含输入路径、密钥和可选输出路径的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 密钥为空。
/// * 无法打开输入文件，或显式指定的输出文件已存在且未指定 `--force`。
/// * 无法创建输出文件。
/// * 输入文件过大，无法用 BMP 头部描述，或读写过程中发生 I/O 错误。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    // 默认输出为当前目录下的 encoded.bmp，每次运行都会覆盖
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENCODED_NAME));
    ensure_output_allowed(&args.file, &dest, args.dest.is_some(), args.force)?;

    let input = open_input(&args.file)?;
    let payload_len = input
        .metadata()
        .with_context(|| {
            format!(
                "Unable to determine the size of: {}",
                args.file.to_string_lossy().red().bold()
            )
        })?
        .len();

    let output = create_output(&dest)?;

    let header = encode(input, payload_len, &key, output).with_context(|| {
        format!(
            "Failed to encode '{}' into an image. \nThe output file may be incomplete.",
            args.file.to_string_lossy().red().bold()
        )
    })?;

    let geometry = header.geometry();
    println!(
        "Conversion complete ({} bytes into a {}x{} image). Output saved as: {}",
        payload_len.to_string().green(),
        geometry.width,
        geometry.height,
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 负责打开图像文件和输出文件，调用解码流水线还原载荷。
///
/// # Arguments
///
/// * `args` - 包含图像路径、密钥和输出路径的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 密钥为空。
/// * 无法打开图像文件，或输出文件已存在且未指定 `--force`。
/// * 无法创建输出文件。
/// * 图像头部或像素数据被截断，或在严格模式下头部校验失败。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    ensure_output_allowed(&args.image, &args.output, true, args.force)?;

    let image = open_input(&args.image)?;
    let output = create_output(&args.output)?;

    let decoded = decode(image, &key, output, args.strict).with_context(|| {
        format!(
            "Failed to decode '{}'. \nThe image may not have been produced by this tool or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let expected = decoded.header.payload_len();
    if decoded.bytes_written < expected {
        println!(
            "{} the image records {} bytes but its canvas only holds {}.",
            "Warning:".yellow().bold(),
            expected.to_string().red(),
            decoded.bytes_written.to_string().yellow()
        );
    }

    println!(
        "Decoded successfully ({} bytes). Output saved as: {}",
        decoded.bytes_written.to_string().green(),
        args.output.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Inspect' 命令的执行逻辑：打印头部中的几何信息和记录的载荷长度。
///
/// # Errors
///
/// 无法打开图像文件或文件不足 54 字节时返回错误。
pub fn handle_inspect(args: InspectArgs) -> Result<()> {
    let mut image = open_input(&args.image)?;
    let header = BmpHeader::read_from(&mut image).with_context(|| {
        format!(
            "Unable to read BMP headers from: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let geometry = header.geometry();

    println!("Image:          {}", args.image.to_string_lossy().bold());
    println!("Dimensions:     {}x{}", header.info.width, header.info.height);
    println!("Bits per pixel: {}", header.info.bit_count);
    println!("Row padding:    {}", geometry.padding());
    println!("Row stride:     {}", geometry.row_stride());
    println!("Payload length: {}", header.payload_len().to_string().green());

    match header.validate() {
        Ok(()) => println!("Header:         {}", "valid".green().bold()),
        Err(err) => println!("Header:         {} ({})", "invalid".red().bold(), err),
    }

    Ok(())
}
