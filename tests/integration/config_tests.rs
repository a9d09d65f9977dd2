use dupesweep::config::Config;
use dupesweep::duplicates::ScanMode;
use figment::providers::Env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_from_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupesweep.toml");
    fs::write(
        &path,
        r#"
mode = "content"
follow_symlinks = true
text_extensions = ["txt", "rs"]
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.mode, ScanMode::Content);
    assert!(config.follow_symlinks);
    assert_eq!(config.text_extensions, vec!["txt".to_string(), "rs".to_string()]);
}

#[test]
fn test_config_env_layer_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupesweep.toml");
    fs::write(&path, "mode = \"exact\"\nworkers = 2\n").unwrap();

    // A prefix no other test uses, so parallel tests do not interfere.
    std::env::set_var("DSENVTEST_MODE", "date");
    std::env::set_var("DSENVTEST_WORKERS", "12");

    let config: Config = Config::figment(Some(&path))
        .merge(Env::prefixed("DSENVTEST_"))
        .extract()
        .unwrap();

    std::env::remove_var("DSENVTEST_MODE");
    std::env::remove_var("DSENVTEST_WORKERS");

    assert_eq!(config.mode, ScanMode::Date);
    assert_eq!(config.workers, Some(12));
}

#[test]
fn test_config_round_trips_through_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.toml");
    let config = Config {
        mode: ScanMode::SizeOnly,
        skip_hidden: true,
        ignore_patterns: vec!["*.iso".into()],
        ..Config::default()
    };

    fs::write(&path, config.to_toml().unwrap()).unwrap();
    let loaded = Config::load(Some(&path)).unwrap();

    assert_eq!(loaded.mode, ScanMode::SizeOnly);
    assert!(loaded.skip_hidden);
    assert_eq!(loaded.ignore_patterns, vec!["*.iso".to_string()]);
}
