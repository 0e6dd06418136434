use gridwatch::config::Config;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.price.url = "https://example.test/prices".to_string();
    cfg.carbon.zone_a = "SE-SE1".to_string();
    cfg.poll_interval_ms = 30_000;

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.price.url, "https://example.test/prices");
    assert_eq!(loaded.carbon.zone_a, "SE-SE1");
    assert_eq!(loaded.poll_interval_ms, 30_000);
}

#[test]
fn defaults_pass_validation() {
    let cfg = Config::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.price.thresholds.low, 70.0);
    assert_eq!(cfg.price.thresholds.high, 150.0);
    assert_eq!(cfg.carbon.thresholds.low, 100.0);
    assert_eq!(cfg.carbon.thresholds.high, 250.0);
    assert_eq!(cfg.poll_interval_ms, 600_000);
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();

    // Empty price URL
    cfg.price.url.clear();
    assert!(cfg.validate().is_err());

    // Empty zone key
    cfg = Config::default();
    cfg.carbon.zone_b.clear();
    assert!(cfg.validate().is_err());

    // Poll interval zero
    cfg = Config::default();
    cfg.poll_interval_ms = 0;
    assert!(cfg.validate().is_err());

    // Inverted thresholds
    cfg = Config::default();
    cfg.carbon.thresholds.low = 300.0;
    assert!(cfg.validate().is_err());

    // Unknown failure policy
    cfg = Config::default();
    cfg.failure.policy = "shrug".to_string();
    assert!(cfg.validate().is_err());
}

#[test]
fn partial_yaml_fills_missing_sections_with_defaults() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");
    fs::write(&path, "poll_interval_ms: 5000\nfailure:\n  policy: skip\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();
    assert_eq!(cfg.poll_interval_ms, 5000);
    assert_eq!(cfg.failure.policy, "skip");
    assert_eq!(cfg.price.selector, "#priceList > li");
    assert_eq!(cfg.carbon.path, "/v3/state");
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}
