use clap::Parser;

use bmpwrap::{
    cli::{Cli, Commands},
    handler::{handle_decode, handle_encode, handle_inspect},
};

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`encode`、`decode` 或 `inspect`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 参数错误以状态码 1 退出，帮助与版本信息以 0 退出
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        err.print().ok();
        std::process::exit(if err.use_stderr() { 1 } else { 0 });
    });

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Encode(args) => handle_encode(args),
        Commands::Decode(args) => handle_decode(args),
        Commands::Inspect(args) => handle_inspect(args),
    }
}
