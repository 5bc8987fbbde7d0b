#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use paycheck_planner::{
    config::ConfigManager, core::services::AccountService, JsonStore, PlannerStore,
};
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestEnv {
    pub base: PathBuf,
    pub store: Arc<JsonStore>,
    pub config_manager: ConfigManager,
}

impl TestEnv {
    pub fn planner_store(&self) -> Arc<dyn PlannerStore> {
        self.store.clone()
    }

    pub fn data_file(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    pub fn create_account(&self, name: &str) -> Uuid {
        AccountService::create(self.store.as_ref(), name, Uuid::new_v4())
            .expect("create budget account")
            .id
    }
}

/// Creates an isolated planner directory for each test.
pub fn setup_test_env() -> TestEnv {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config_manager =
        ConfigManager::with_base_dir(&base).expect("create config manager for temp dir");
    let config = config_manager.load().expect("load default config");
    let store = JsonStore::open(config.resolve_data_file(&base)).expect("open json store");

    TestEnv {
        base,
        store: Arc::new(store),
        config_manager,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
