//! 設定ファイル
//!
//! JSON形式のキーバインド設定。設定は読み込むだけで書き戻さない。
//!
//! ```json
//! {
//!   "kill_ring_capacity": 100,
//!   "bindings": { "C-j": "newline", "C-x f": "action:editor.action.fold" },
//!   "unbind": ["C-z"]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::editor::kill_ring::DEFAULT_CAPACITY;
use crate::error::{ConfigError, InputError, Result};
use crate::input::commands::Command;
use crate::input::keybinding::KeyToken;
use crate::input::keymap::CommandTable;

const CONFIG_DIR_NAME: &str = "emacs-keys";
const CONFIG_FILE_NAME: &str = "config.json";

/// キーバインド層の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// キルリングの最大保持数
    pub kill_ring_capacity: usize,
    /// キーシーケンス → コマンド名（`action:<id>` でホストアクション）
    pub bindings: BTreeMap<String, String>,
    /// 既定バインドから削除するキーシーケンス
    pub unbind: Vec<String>,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            kill_ring_capacity: DEFAULT_CAPACITY,
            bindings: BTreeMap::new(),
            unbind: Vec::new(),
        }
    }
}

impl KeysConfig {
    /// JSON文字列から読み込む
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: KeysConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// ファイルから読み込む（`~` と環境変数を展開）
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_path(path.as_ref())?;
        let display = path.display().to_string();

        let json = fs::read_to_string(&path).map_err(|e| ConfigError::InvalidFile {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let config: KeysConfig = serde_json::from_str(&json).map_err(|e| ConfigError::InvalidFile {
            path: display.clone(),
            message: e.to_string(),
        })?;
        config.validate()?;

        log::info!("loaded key configuration from {}", display);
        Ok(config)
    }

    /// 既定の設定ファイルパス（`<config dir>/emacs-keys/config.json`）
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 既定の場所から読み込む。ファイルが無ければ既定値。
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("no configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// 値の検証
    pub fn validate(&self) -> Result<()> {
        if self.kill_ring_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "kill_ring_capacity".to_string(),
                value: self.kill_ring_capacity.to_string(),
            }
            .into());
        }

        for sequence in self.bindings.keys().chain(self.unbind.iter()) {
            KeyToken::parse(sequence)?;
        }

        for name in self.bindings.values() {
            if Command::from_name(name).is_none() {
                return Err(InputError::CommandNotFound { command: name.clone() }.into());
            }
        }

        Ok(())
    }

    /// テーブルへ反映する（削除してから追加）
    pub fn apply(&self, table: &mut CommandTable) -> Result<()> {
        for sequence in &self.unbind {
            let key = KeyToken::parse(sequence)?;
            if table.unregister(&key).is_none() {
                log::warn!("unbind: {} was not bound", sequence);
            }
        }

        for (sequence, name) in &self.bindings {
            table.register_str(sequence, name)?;
        }

        Ok(())
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).map_err(|e| ConfigError::InvalidValue {
        key: "path".to_string(),
        value: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}
