// ==================== Configuration Tests ====================

use maungdb::config::CONFIG_FILE_NAME;
use maungdb::{Config, DbError};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::from_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_read_back() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        data_dir: PathBuf::from("/srv/maung"),
        database: "kantor".to_string(),
        username: "ani".to_string(),
        role: "admin".to_string(),
        ..Config::default()
    };
    config.save(dir.path()).unwrap();

    let loaded = Config::from_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "database = [1, 2").unwrap();

    assert!(matches!(
        Config::from_file(&path),
        Err(DbError::TomlError(_))
    ));
}
