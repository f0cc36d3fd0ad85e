use parley::storage::SledStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SledStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("conversations.db");
    let storage = SledStore::open(db_path).expect("failed to open sled storage at path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config pointing the gateway at `endpoint` with fast timeouts and no
/// terminal decoration
#[allow(dead_code)]
pub fn gateway_config_yaml(endpoint: &str) -> String {
    format!(
        "gateway:\n  endpoint: {}\n  model: test-model\n  max_tokens: 32\n  timeout_seconds: 2\nchat:\n  show_timestamps: false\n  typing_indicator: false\n",
        endpoint
    )
}
