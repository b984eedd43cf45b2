//! コマンドテーブル
//!
//! 解決済みキー（単一キーまたは "プレフィックス キー"）からコマンドへの対応表。

use std::collections::HashMap;

use serde::Serialize;

use super::commands::{Command, Motion};
use super::keybinding::KeyToken;
use super::sequence::is_prefix_key;
use crate::error::{InputError, Result};

/// 既定のキーバインド
const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("M-/", "trigger-suggest"),
    ("C-'", "trigger-suggest"),
    ("M-;", "comment-line"),
    ("C-t", "transpose-letters"),
    ("C-x C-p", "select-all"),
    ("Tab", "format-document"),
    ("C-Backspace", "delete-word-left"),
    ("M-Backspace", "delete-word-left"),
    ("M-Delete", "delete-word-left"),
    ("C-d", "delete-right"),
    ("C-h", "delete-left"),
    ("M-d", "delete-word-right"),
    ("C-x C-u", "upcase"),
    ("C-x C-l", "downcase"),
    ("C-v", "page-down"),
    ("PageDown", "page-down"),
    ("M-v", "page-up"),
    ("PageUp", "page-up"),
    ("M-g n", "next-marker"),
    ("M-g p", "previous-marker"),
    ("C-M-n", "add-selection-to-next-match"),
    ("S-C-SPC", "parameter-hints"),
    ("C-s", "search"),
    ("C-r", "search"),
    ("S-M-5", "search-replace"),
    ("C-SPC", "set-mark"),
    ("S-C-2", "set-mark"),
    ("C-/", "undo"),
    ("S-C--", "undo"),
    ("C-z", "undo"),
    ("C-x u", "undo"),
    ("S-C-Backspace", "delete-lines"),
    ("C-k", "kill-line"),
    ("C-m", "newline"),
    ("C-o", "open-line"),
    ("C-w", "kill-region"),
    ("M-w", "copy-region"),
    ("C-y", "yank"),
    ("M-y", "yank-pop"),
    ("C-g", "keyboard-quit"),
    ("C-l", "recenter"),
    ("C-q Tab", "insert-tab"),
    ("M-r", "move-to-window-line"),
    ("M-g g", "goto-line"),
    ("M-g M-g", "goto-line"),
    ("C-x C-x", "exchange-point-and-mark"),
];

const DEFAULT_MOTIONS: &[(&str, Motion)] = &[
    ("C-n", Motion::Down),
    ("C-p", Motion::Up),
    ("C-f", Motion::Right),
    ("C-b", Motion::Left),
    ("M-f", Motion::WordRight),
    ("M-b", Motion::WordLeft),
    ("C-e", Motion::LineEnd),
    ("C-a", Motion::LineStart),
    ("S-M-.", Motion::BufferBottom),
    ("S-M-,", Motion::BufferTop),
];

/// 一覧表示用のバインド情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    pub key: String,
    pub command: String,
    pub description: String,
}

/// キーからコマンドへの対応表
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    bindings: HashMap<KeyToken, Command>,
}

impl CommandTable {
    /// 空のテーブル
    pub fn new() -> Self {
        Self::default()
    }

    /// 既定のバインドで初期化
    pub fn with_defaults() -> Self {
        let mut table = Self::new();

        for (key, name) in DEFAULT_BINDINGS {
            if let Some(command) = Command::from_name(name) {
                table.register(KeyToken::new(*key), command);
            }
        }
        for (key, motion) in DEFAULT_MOTIONS {
            table.register(KeyToken::new(*key), Command::Move(*motion));
        }

        table
    }

    /// バインドを追加または置き換え。置き換えた場合は以前のコマンドを返す。
    pub fn register(&mut self, key: KeyToken, command: Command) -> Option<Command> {
        if is_prefix_key(&key) {
            log::warn!("{} is a prefix key and can never be dispatched on its own", key);
        }
        log::debug!("bind {} -> {}", key, command.name());
        self.bindings.insert(key, command)
    }

    /// 文字列表現からバインドを追加
    pub fn register_str(&mut self, sequence: &str, command_name: &str) -> Result<Option<Command>> {
        let key = KeyToken::parse(sequence)?;
        let command = Command::from_name(command_name).ok_or_else(|| InputError::CommandNotFound {
            command: command_name.to_string(),
        })?;
        Ok(self.register(key, command))
    }

    /// バインドを削除
    pub fn unregister(&mut self, key: &KeyToken) -> Option<Command> {
        self.bindings.remove(key)
    }

    pub fn get(&self, key: &KeyToken) -> Option<&Command> {
        self.bindings.get(key)
    }

    pub fn contains(&self, key: &KeyToken) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// キー順に並べたバインド一覧
    pub fn mappings(&self) -> Vec<BindingInfo> {
        let mut mappings: Vec<BindingInfo> = self
            .bindings
            .iter()
            .map(|(key, command)| BindingInfo {
                key: key.to_string(),
                command: command.name().to_string(),
                description: command.description().to_string(),
            })
            .collect();
        mappings.sort_by(|a, b| a.key.cmp(&b.key));
        mappings
    }

    /// バインド一覧をJSONで出力
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.mappings())?)
    }
}
