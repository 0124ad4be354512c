//! CLI 테스트 (dry-run, 네트워크 없음)

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

/// 작업 디렉터리를 `dir` 로 두고 관련 환경 변수를 비운 명령
fn bot_command(dir: &Path) -> Command {
  let mut command = Command::new(env!("CARGO_BIN_EXE_bot"));
  command
    .current_dir(dir)
    .args(["--dry-run", "--config"])
    .arg(dir.join("missing-config.json"))
    .env("RUST_LOG", "off");
  for name in ["BINANCE_API_KEY", "BINANCE_API_SECRET", "BASE_URL", "BOT_LOGFILE", "BOT_VENUE", "BOT_DRY_RUN"] {
    command.env_remove(name);
  }
  command
}

fn run_bot(dir: &Path, args: &[&str]) -> Output {
  bot_command(dir)
    .arg("--log-file")
    .arg(dir.join("bot.log"))
    .args(args)
    .output()
    .expect("failed to run bot binary")
}

#[test]
fn test_market_prints_ack_json() {
  let dir = tempfile::tempdir().unwrap();
  let output = run_bot(dir.path(), &["market", "--symbol", "btcusdt", "--side", "buy", "--quantity", "0.002"]);

  assert!(output.status.success());
  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["symbol"], "BTCUSDT");
  assert_eq!(json["side"], "BUY");
  assert_eq!(json["origQty"], "0.002");

  let audit = std::fs::read_to_string(dir.path().join("bot.log")).unwrap();
  let lines: Vec<&str> = audit.lines().collect();
  assert_eq!(lines.len(), 2);
  assert!(lines[0].contains("| INFO | Initialized dry-run bot (futures, dry run)"));
  assert!(lines[1].contains("| INFO | Market BUY 0.002 BTCUSDT"));
}

#[test]
fn test_dotenv_file_is_read() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join(".env"), "BOT_LOGFILE=from-dotenv.log\nBOT_VENUE=spot\n").unwrap();

  let output = bot_command(dir.path())
    .args(["market", "--symbol", "BTCUSDT", "--side", "BUY", "--quantity", "0.001"])
    .output()
    .expect("failed to run bot binary");

  assert!(output.status.success());
  let audit = std::fs::read_to_string(dir.path().join("from-dotenv.log")).unwrap();
  assert!(audit.contains("Initialized dry-run bot (spot, dry run)"));
  assert!(audit.contains("Market BUY 0.001 BTCUSDT"));
}

#[test]
fn test_twap_prints_wrapped_results() {
  let dir = tempfile::tempdir().unwrap();
  let output = run_bot(
    dir.path(),
    &["twap", "--symbol", "BTCUSDT", "--side", "SELL", "--quantity", "0.009", "--parts", "3", "--interval", "0"],
  );

  assert!(output.status.success());
  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  let results = json["twap_results"].as_array().unwrap();
  assert_eq!(results.len(), 3);
  assert!(results.iter().all(|r| r["origQty"] == "0.003"));
}

#[test]
fn test_invalid_quantity_exits_non_zero() {
  let dir = tempfile::tempdir().unwrap();
  let output = run_bot(dir.path(), &["market", "--symbol", "ethusdt", "--side", "sell", "--quantity", "-1"]);

  assert!(!output.status.success());
  assert!(output.stdout.is_empty());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid quantity"));
  assert!(!dir.path().join("bot.log").exists());
}

#[test]
fn test_zero_parts_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let output = run_bot(dir.path(), &["twap", "--symbol", "BTCUSDT", "--side", "BUY", "--quantity", "1", "--parts", "0"]);

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid parts"));
}
