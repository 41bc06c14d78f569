use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "mathtrail-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_mathtrail-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("full-game-perfect"));
}

#[test]
fn cli_runs_smoke_with_csv_report() {
    let exe = env!("CARGO_BIN_EXE_mathtrail-tester");
    let output_path = temp_path("smoke.csv");
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "smoke",
            "--seeds",
            "1,tiger-12",
            "--iterations",
            "2",
            "--report",
            "csv",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Math Trail Automated Tester"));
    assert!(stdout.contains("TIGER-12"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let mut lines = content.lines();
    assert!(lines.next().expect("header").starts_with("scenario,seed,mode"));
    assert_eq!(lines.count(), 4);
}

#[test]
fn cli_rejects_bad_config_file() {
    let exe = env!("CARGO_BIN_EXE_mathtrail-tester");
    let config_path = temp_path("bad-config.json");
    std::fs::write(&config_path, r#"{"dice": {"faces": 0}}"#).expect("write config");
    let output = Command::new(exe)
        .args(["--scenarios", "smoke", "--iterations", "1", "--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
