use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_faultline"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "faultline init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".faultline.toml");
    assert!(config_path.exists(), ".faultline.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[scope]"));
    assert!(content.contains("[mutation]"));
    assert!(content.contains("[policy]"));

    // Verify it's valid TOML that faultline-core can parse
    let _config: faultline_core::FaultlineConfig = toml::from_str(&content).unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".faultline.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_faultline"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}
