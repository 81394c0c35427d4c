//! Tests for configuration loading and filesystem wiring.

use mindia::{Backends, Mindia, MindiaConfig};
use mindia_error::MindiaErrorKind;
use std::io::Write;

#[test]
fn explicit_file_overrides_bundled_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[storage]\nfile_dir = \"/srv/media/files\"\n\n[colorize]\nenabled = true\nrender_factor = 20"
    )
    .unwrap();

    let config = MindiaConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.storage.file_dir.to_str(), Some("/srv/media/files"));
    assert!(config.colorize.enabled);
    assert_eq!(config.colorize.render_factor, 20);
    assert_eq!(config.colorize.model_name, "Artistic");
    assert_eq!(config.scheduler.max_tasks_per_tick, 16);
}

#[test]
fn missing_explicit_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.toml");
    let err = MindiaConfig::load(Some(absent.as_path())).unwrap_err();
    assert!(matches!(err.kind(), MindiaErrorKind::Config(_)));
}

#[test]
fn malformed_values_are_rejected() {
    let err = MindiaConfig::from_toml("[scheduler]\npoll_interval_secs = \"soon\"").unwrap_err();
    assert!(matches!(err.kind(), MindiaErrorKind::Config(_)));
}

#[test]
fn colorize_settings_build_client_config() {
    let config = MindiaConfig::defaults().unwrap();
    let replicate = config.colorize.to_replicate_config("secret").unwrap();
    assert_eq!(replicate.api_token(), "secret");
    assert_eq!(replicate.model_name(), "Artistic");
    assert_eq!(*replicate.render_factor(), 35);
}

#[tokio::test]
async fn filesystem_backends_round_trip_named_transformations() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().display().to_string();
    let config = MindiaConfig::from_toml(&format!(
        "[storage]\n\
         file_dir = \"{root}/files\"\n\
         cache_dir = \"{root}/cache\"\n\
         named_transformations = \"{root}/named.json\"\n\
         media_records = \"{root}/media.json\"\n\
         tasks = \"{root}/tasks.json\"\n"
    ))
    .unwrap();

    let mindia = Mindia::assemble(Backends::filesystem(&config.storage).unwrap(), &config, None).unwrap();
    mindia.named().create("thumb", "c_scale,w_100").await.unwrap();

    let reopened =
        Mindia::assemble(Backends::filesystem(&config.storage).unwrap(), &config, None).unwrap();
    let all = reopened.named().list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].reference(), "t_thumb");
}
