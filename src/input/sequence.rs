//! キーシーケンス状態機械
//!
//! 正規化済みトークンを1つずつ受け取り、数値引数（`C-u`）モードと
//! 2キープレフィックスを追跡する。結果は「飲み込み」か解決済みキーのどちらか。

use super::keybinding::KeyToken;

/// 2キーシーケンスを開始するキー
pub const PREFIX_KEYS: [&str; 4] = ["M-g", "C-x", "C-q", "C-u"];
/// 数値引数モードを開始するキー
pub const ARGUMENT_KEY: &str = "C-u";
/// 保留中の状態を取り消すキー
pub const QUIT_KEY: &str = "C-g";

/// `step` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// 入力を消費した（ディスパッチしない）
    Swallow,
    /// 解決済みキー（単一キーまたは "プレフィックス キー"）
    Resolved(KeyToken),
}

/// 状態機械からディスパッチャへ渡す解決済みコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub key: KeyToken,
    pub repeat_count: usize,
    pub is_repeat_of_last: bool,
}

/// プレフィックスキーかどうか
pub fn is_prefix_key(key: &KeyToken) -> bool {
    PREFIX_KEYS.contains(&key.as_str())
}

/// キーシーケンスの状態
#[derive(Debug, Clone, Default)]
pub struct SequenceState {
    argument_mode: bool,
    pending_prefix: Option<KeyToken>,
    input_buffer: Option<String>,
    last_input_buffer: Option<String>,
    last_command_key: Option<KeyToken>,
}

impl SequenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// トークンを1つ処理する
    pub fn step(&mut self, key: &KeyToken) -> Step {
        if key == QUIT_KEY && self.has_transient_state() {
            log::trace!("{} cancels pending sequence {:?}", key, self.readable_state());
            self.reset();
            return Step::Swallow;
        }

        if self.argument_mode {
            if let Some(digit) = key.as_digit() {
                self.input_buffer.get_or_insert_with(String::new).push(digit);
                return Step::Swallow;
            }

            if is_prefix_key(key) {
                // 引数は次のプレフィックス付きコマンドに持ち越す
                self.last_input_buffer = self.input_buffer.take();
                self.argument_mode = false;
                self.pending_prefix = Some(key.clone());
                log::trace!("argument frozen, prefix {} pending", key);
                return Step::Swallow;
            }
        } else if self.pending_prefix.is_none() && key == ARGUMENT_KEY {
            self.argument_mode = true;
            self.input_buffer = None;
            self.last_input_buffer = None;
            log::trace!("argument mode entered");
            return Step::Swallow;
        }

        match self.pending_prefix.take() {
            None if is_prefix_key(key) => {
                self.pending_prefix = Some(key.clone());
                log::trace!("prefix {} pending", key);
                Step::Swallow
            }
            None => Step::Resolved(key.clone()),
            Some(prefix) => Step::Resolved(KeyToken::combine(&prefix, key)),
        }
    }

    /// 引数モードまたはプレフィックス待ちかどうか
    pub fn has_transient_state(&self) -> bool {
        self.argument_mode || self.pending_prefix.is_some()
    }

    pub fn in_argument_mode(&self) -> bool {
        self.argument_mode
    }

    pub fn pending_prefix(&self) -> Option<&KeyToken> {
        self.pending_prefix.as_ref()
    }

    /// 入力済みの数値引数（凍結済みのものを優先）
    pub fn input_buffer(&self) -> Option<&str> {
        self.last_input_buffer.as_deref().or(self.input_buffer.as_deref())
    }

    /// 繰り返し回数。空・不正・0の場合は1。
    pub fn repeat_count(&self) -> usize {
        self.input_buffer()
            .and_then(|digits| digits.parse::<usize>().ok())
            .filter(|count| *count > 0)
            .unwrap_or(1)
    }

    /// 直前にディスパッチしたキーと同じかどうか
    pub fn is_repeat_of(&self, key: &KeyToken) -> bool {
        self.last_command_key.as_ref() == Some(key)
    }

    pub fn last_command_key(&self) -> Option<&KeyToken> {
        self.last_command_key.as_ref()
    }

    /// ディスパッチ後に呼び出し側が更新する
    pub fn set_last_command_key(&mut self, key: KeyToken) {
        self.last_command_key = Some(key);
    }

    /// 解決済みキーに繰り返し情報を付与する
    pub fn resolve(&self, key: KeyToken) -> ResolvedCommand {
        ResolvedCommand {
            repeat_count: self.repeat_count(),
            is_repeat_of_last: self.is_repeat_of(&key),
            key,
        }
    }

    /// 一時状態をクリア（`last_command_key` は保持）
    pub fn reset(&mut self) {
        self.argument_mode = false;
        self.pending_prefix = None;
        self.input_buffer = None;
        self.last_input_buffer = None;
    }

    /// 表示用の状態文字列（例: `"C-u 4"`, `"C-x"`, `"C-u 4 C-x"`）
    pub fn readable_state(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();

        if self.argument_mode || self.last_input_buffer.is_some() {
            parts.push(ARGUMENT_KEY);
            if let Some(digits) = self.input_buffer() {
                parts.push(digits);
            }
        }

        if let Some(prefix) = &self.pending_prefix {
            parts.push(prefix.as_str());
        }

        parts.join(" ")
    }
}
