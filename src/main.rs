use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use pagecloak::config::{DEFAULT_CONFIG_PATH, StaticConfig, get_config, init_config_from};
use pagecloak::errors::CloakError;
use pagecloak::runtime::modes::run_server;
use pagecloak::system::{DEFAULT_CRASH_LOG, init_logging, install_panic_hook};

#[derive(Parser, Debug)]
#[command(name = "pagecloak", version, about = "Cloaked landing-page routing service")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// 生成示例配置文件后退出
    #[arg(long, value_name = "PATH")]
    generate_config: Option<String>,
}

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if let Some(path) = args.generate_config.as_deref() {
        match StaticConfig::default().save_to_file(path) {
            Ok(()) => println!("{} {}", "Sample config written to".green(), path),
            Err(e) => {
                eprintln!("{} {}", "Failed to write sample config:".red().bold(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    init_config_from(&args.config);
    let config = get_config();

    // guard 必须活到进程结束，否则非阻塞写入的日志会丢失
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Failed to initialize logging:".red().bold(), e);
            std::process::exit(1);
        }
    };
    install_panic_hook(Some(PathBuf::from(DEFAULT_CRASH_LOG)));

    if let Err(e) = run_server().await {
        match e.downcast_ref::<CloakError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("{} {:#}", "Server error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}
