//! 进程级 panic 钩子
//!
//! 访客路径上的 panic 会被 actix 吞掉，只剩一行 worker 日志；这里把原因、
//! 位置和回溯写进 tracing 与 crash 日志，方便事后排查。

use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};

use chrono::Utc;
use colored::Colorize;
use tracing::error;

pub const DEFAULT_CRASH_LOG: &str = "crash.log";

/// 安装 panic 钩子，`crash_log` 为 `None` 时只打日志
pub fn install_panic_hook(crash_log: Option<PathBuf>) {
    panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());
        let backtrace = std::backtrace::Backtrace::force_capture();

        error!(%location, "panic: {}", message);

        if let Some(path) = crash_log.as_deref() {
            if let Err(e) = write_crash_report(path, &message, &location, &backtrace) {
                eprintln!("Failed to write crash log {}: {}", path.display(), e);
            }
        }

        eprintln!(
            "{} {} ({})",
            "PANIC".red().bold(),
            message.white(),
            location.dimmed()
        );
    }));
}

/// 从 panic payload 中取出可读的消息
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn write_crash_report(
    path: &Path,
    message: &str,
    location: &str,
    backtrace: &std::backtrace::Backtrace,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(file, "==========================================")?;
    writeln!(
        file,
        "Crash Report - {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "Message: {}", message)?;
    writeln!(file, "Location: {}", location)?;
    writeln!(file, "\nBacktrace:\n{:?}", backtrace)?;
    writeln!(file, "==========================================\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(owned.as_ref()), "owned boom");

        let other: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }

    #[test]
    fn test_write_crash_report_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.log");
        let bt = std::backtrace::Backtrace::disabled();

        write_crash_report(&path, "first", "a.rs:1:1", &bt).unwrap();
        write_crash_report(&path, "second", "b.rs:2:2", &bt).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Message: first"));
        assert!(content.contains("Message: second"));
        assert!(content.contains("Location: b.rs:2:2"));
    }
}
