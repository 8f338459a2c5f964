use anyhow::Ok;
use bmpwrap::{
    bmp::BmpHeader,
    cli::{Cli, Commands, DecodeArgs, EncodeArgs, InspectArgs},
    handler::{handle_decode, handle_encode, handle_inspect},
};
use clap::Parser;
use image::ImageFormat;
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个随机内容的输入文件
fn create_random_file(path: &Path, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::rng().fill_bytes(&mut data);
    fs::write(path, &data).expect("Failed to create test input.");
    data
}

fn encode_args(file: &Path, key: &str, dest: Option<&Path>, force: bool) -> EncodeArgs {
    EncodeArgs {
        file: file.to_path_buf(),
        key: key.to_string(),
        dest: dest.map(Path::to_path_buf),
        force,
    }
}

fn decode_args(image: &Path, key: &str, output: &Path, force: bool) -> DecodeArgs {
    DecodeArgs {
        image: image.to_path_buf(),
        key: key.to_string(),
        output: output.to_path_buf(),
        force,
        strict: false,
    }
}

/// 验证从编码到解码的完整流程，载荷长度需要用到高 16 位
#[test]
fn test_handle_encode_and_decode_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let image_path = dir.path().join("wrapped.bmp");
    let recovered_path = dir.path().join("recovered.bin");

    let original = create_random_file(&source_path, 70_000);

    // 2. 测试 handle_encode
    handle_encode(encode_args(&source_path, "correct horse", Some(&image_path), false))?;
    assert!(image_path.exists(), "Encoded image should be created.");

    let image = fs::read(&image_path)?;
    let header = BmpHeader::read_from(&mut image.as_slice())?;
    assert_eq!(header.payload_len(), 70_000);
    assert_eq!(header.info.width, 265);
    assert_eq!(image.len() as u32, header.file.file_size);

    // 3. 测试 handle_decode
    let mut args = decode_args(&image_path, "correct horse", &recovered_path, false);
    args.strict = true;
    handle_decode(args)?;

    // 4. 验证结果
    let recovered = fs::read(&recovered_path)?;
    assert!(
        recovered == original,
        "Recovered bytes must match the original."
    );

    handle_inspect(InspectArgs { image: image_path })?;

    Ok(())
}

/// 验证不提供输出路径时，在当前目录生成 encoded.bmp，且重复运行会直接覆盖
/// (本进程中唯一修改当前目录的测试，其余测试均使用绝对路径)
#[test]
fn test_handle_encode_with_default_dest() -> anyhow::Result<()> {
    // 1. 准备环境：输入文件位于子目录，当前目录切换到临时目录
    let dir = tempdir()?;
    let sub_dir = dir.path().join("sub");
    fs::create_dir(&sub_dir)?;
    let source_path = sub_dir.join("notes.txt");
    fs::write(&source_path, "Testing default path generation.")?;

    let previous_dir = std::env::current_dir()?;
    std::env::set_current_dir(dir.path())?;

    // 2. 连续两次不提供 dest 路径，第二次不需要 --force
    let first = handle_encode(encode_args(&source_path, "abc", None, false));
    fs::write(&source_path, "Second run overwrites the default output.")?;
    let second = handle_encode(encode_args(&source_path, "abc", None, false));

    std::env::set_current_dir(&previous_dir)?;
    first?;
    second?;

    // 3. 输出位于当前目录，而非输入文件旁
    let expected_path = dir.path().join("encoded.bmp");
    assert!(
        expected_path.exists(),
        "Default encoded image should be created at: {:?}",
        expected_path
    );
    assert!(!sub_dir.join("encoded.bmp").exists());

    // 4. 解码得到第二次运行的内容
    let recovered_path = dir.path().join("notes.out");
    handle_decode(decode_args(&expected_path, "abc", &recovered_path, false))?;
    assert_eq!(
        fs::read_to_string(&recovered_path)?,
        "Second run overwrites the default output."
    );

    Ok(())
}

/// 验证编码结果是普通图像库可以打开的 BMP
#[test]
fn test_encoded_image_is_a_readable_bmp() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("ten.bin");
    let image_path = dir.path().join("ten.bmp");
    create_random_file(&source_path, 10);

    handle_encode(encode_args(&source_path, "abc", Some(&image_path), false))?;

    let bytes = fs::read(&image_path)?;
    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Bmp)?;
    assert_eq!((decoded.width(), decoded.height()), (4, 4));

    Ok(())
}

/// 验证空文件编码为 1x1 图像并还原为空文件
#[test]
fn test_empty_file_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("empty.bin");
    let image_path = dir.path().join("empty.bmp");
    let recovered_path = dir.path().join("empty.out");
    fs::write(&source_path, b"")?;

    handle_encode(encode_args(&source_path, "k", Some(&image_path), false))?;
    let bytes = fs::read(&image_path)?;
    let header = BmpHeader::read_from(&mut bytes.as_slice())?;
    assert_eq!((header.info.width, header.info.height), (1, 1));
    assert_eq!(header.payload_len(), 0);

    handle_decode(decode_args(&image_path, "k", &recovered_path, false))?;
    assert!(recovered_path.exists());
    assert!(fs::read(&recovered_path)?.is_empty());

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("data.bin");
    let dest_path = dir.path().join("dest.bmp");
    create_random_file(&source_path, 100);

    // 2. 场景一：测试覆盖保护
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let result = handle_encode(encode_args(&source_path, "key", Some(&dest_path), false));
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let result = handle_encode(encode_args(&source_path, "key", Some(&dest_path), true));
    assert!(result.is_ok(), "Execution should succeed with --force when file exists.");

    let content = fs::read(&dest_path)?;
    assert_ne!(content, b"this is a dummy file to be overwritten");
    assert_eq!(&content[0..2], b"BM");

    // 4. 输入与输出相同的路径始终被拒绝
    let result = handle_decode(decode_args(&dest_path, "key", &dest_path, true));
    assert!(result.is_err());

    Ok(())
}

/// 验证输入文件不存在时的错误处理
#[test]
fn test_missing_input_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.bin");
    let dest_path = dir.path().join("dest.bmp");

    let result = handle_encode(encode_args(&missing, "key", Some(&dest_path), false));
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Unable to open input file"));
    }
    assert!(!dest_path.exists(), "No output should be created.");

    Ok(())
}

/// 验证严格模式拒绝并非由本工具生成的文件
#[test]
fn test_strict_decode_rejects_non_bmp() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let bogus_path = dir.path().join("bogus.bmp");
    let output_path = dir.path().join("out.bin");
    fs::write(&bogus_path, vec![0x42u8; 128])?;

    let mut args = decode_args(&bogus_path, "key", &output_path, false);
    args.strict = true;
    let result = handle_decode(args);
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("Missing BMP signature"));
    }

    Ok(())
}

/// 验证空密钥在任何文件 I/O 之前被拒绝
#[test]
fn test_empty_key_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("data.bin");
    let dest_path = dir.path().join("dest.bmp");
    create_random_file(&source_path, 10);

    assert!(handle_encode(encode_args(&source_path, "", Some(&dest_path), false)).is_err());
    assert!(!dest_path.exists());

    assert!(Cli::try_parse_from(["bmpwrap", "-i", "data.bin", ""]).is_err());

    Ok(())
}

/// 验证与 `-i` / `-o` 调用方式兼容的命令行解析
#[test]
fn test_cli_short_flags() -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(["bmpwrap", "-i", "photo.raw", "abc"])?;
    match cli.command {
        Commands::Encode(args) => {
            assert_eq!(args.file, Path::new("photo.raw"));
            assert_eq!(args.key, "abc");
            assert!(args.dest.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["bmpwrap", "-o", "encoded.bmp", "abc", "photo.raw"])?;
    match cli.command {
        Commands::Decode(args) => {
            assert_eq!(args.image, Path::new("encoded.bmp"));
            assert_eq!(args.output, Path::new("photo.raw"));
            assert!(!args.strict);
        }
        other => panic!("unexpected command: {other:?}"),
    }

    // 缺少输出文件参数
    assert!(Cli::try_parse_from(["bmpwrap", "-o", "encoded.bmp", "abc"]).is_err());
    // 未知标志
    assert!(Cli::try_parse_from(["bmpwrap", "-x", "file", "abc"]).is_err());

    Ok(())
}
