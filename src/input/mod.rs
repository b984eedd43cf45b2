//! 入力処理モジュール
//!
//! キーの正規化、シーケンス解決、コマンドテーブルとコマンド実行を提供

pub mod commands;
pub mod keybinding;
pub mod keymap;
pub mod sequence;

// 公開API
pub use commands::{Command, CommandContext, Motion};
pub use keybinding::{normalize, KeyCode, KeyToken, RawKeyEvent};
pub use keymap::{BindingInfo, CommandTable};
pub use sequence::{ResolvedCommand, SequenceState, Step};
