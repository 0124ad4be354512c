//! 로깅 유틸리티
//!
//! 콘솔 로그 초기화와 주문 감사 로그(append-only 파일)

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::error::TradingError;

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// 로깅 시스템 초기화. `RUST_LOG` 이 설정 값보다 우선한다.
pub fn init(default_level: &str) -> Result<(), TradingError> {
    let mut builder = Builder::from_default_env();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());

    builder
      .filter_level(parse_level(&log_level))
      .format_timestamp_millis()
      .try_init()
      .map_err(|e| TradingError::ConfigError(format!("logger already initialised: {}", e)))?;

    log::debug!("로깅 시스템 초기화 완료: 레벨 = {}", log_level);

    Ok(())
}

/// 감사 로그 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Error,
}

impl AuditLevel {
    fn as_str(&self) -> &'static str {
        match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Error => "ERROR",
        }
    }
}

/// 주문 시도마다 한 줄씩 기록하는 append-only 로그.
/// 파일이 없으면 콘솔 로그로만 남긴다.
pub struct AuditLog {
    file: Option<Mutex<File>>,
}

impl AuditLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TradingError> {
        let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
        Ok(AuditLog { file: Some(Mutex::new(file)) })
    }

    /// 파일 없이 콘솔 로그만 사용
    pub fn disabled() -> Self {
        AuditLog { file: None }
    }

    pub fn info(&self, message: &str) {
        log::info!("{}", message);
        self.append(AuditLevel::Info, message);
    }

    pub fn error(&self, message: &str) {
        log::error!("{}", message);
        self.append(AuditLevel::Error, message);
    }

    fn append(&self, level: AuditLevel, message: &str) {
        let Some(file) = &self.file else { return };
        let line = format_line(chrono::Utc::now(), level, message);

        let mut guard = match file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // 기록 실패는 경고만 남긴다
        if let Err(e) = guard.write_all(line.as_bytes()).and_then(|_| guard.flush()) {
            log::warn!("감사 로그 기록 실패: {}", e);
        }
    }
}

fn format_line(ts: chrono::DateTime<chrono::Utc>, level: AuditLevel, message: &str) -> String {
    // 한 줄에 한 건
    let message = message.replace('\n', " ");
    format!("{} | {} | {}\n", ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true), level.as_str(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let ts = chrono::Utc.with_ymd_and_hms(2025, 5, 8, 12, 0, 0).unwrap();
        let line = format_line(ts, AuditLevel::Error, "Market BUY 0.003 BTCUSDT failed:\nboom");
        assert_eq!(line, "2025-05-08T12:00:00.000Z | ERROR | Market BUY 0.003 BTCUSDT failed: boom\n");
    }

    #[test]
    fn test_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.log");

        AuditLog::open(&path).unwrap().info("first");
        let log = AuditLog::open(&path).unwrap();
        log.error("second");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("| INFO | first"));
        assert!(lines[1].ends_with("| ERROR | second"));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }
}
