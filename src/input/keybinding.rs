//! キー正規化
//!
//! 物理キーと修飾キーの組から Emacs 表記のキートークン（`C-x`, `M-g`, `a`,
//! `Return` など）を生成する。テーブル検索は文字列キーで行うため、
//! 修飾キーの付与順序はここで固定する。

use crate::error::InputError;
use crossterm::event::{
    KeyCode as CrosstermKeyCode, KeyEvent, KeyModifiers as CrosstermModifiers, ModifierKeyCode,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// 物理キーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// 英字キー
    Letter(char),
    /// 数字キー
    Digit(char),
    /// テンキーの数字
    Numpad(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Tab,
    Backspace,
    Delete,
    Escape,
    Insert,
    PageUp,
    PageDown,
    Home,
    End,
    F(u8),
    Comma,
    Period,
    Slash,
    Backslash,
    Backquote,
    BracketLeft,
    BracketRight,
    Equal,
    Minus,
    Quote,
    Semicolon,
    /// 修飾キー単体
    Alt,
    Control,
    Meta,
    Shift,
    Unknown,
}

impl KeyCode {
    /// 修飾キー単体かどうか
    pub fn is_modifier(self) -> bool {
        matches!(self, KeyCode::Alt | KeyCode::Control | KeyCode::Meta | KeyCode::Shift)
    }

    /// 修飾キーを除いた基本キー表記
    fn base_name(self) -> Option<String> {
        let name = match self {
            KeyCode::Letter(c) if c.is_alphabetic() => c.to_string(),
            KeyCode::Digit(c) | KeyCode::Numpad(c) if c.is_ascii_digit() => c.to_string(),
            KeyCode::ArrowUp => "Up".to_string(),
            KeyCode::ArrowDown => "Down".to_string(),
            KeyCode::ArrowLeft => "Left".to_string(),
            KeyCode::ArrowRight => "Right".to_string(),
            KeyCode::Enter => "Return".to_string(),
            KeyCode::Space => "SPC".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Escape => "Escape".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::F(n) if (1..=24).contains(&n) => format!("F{}", n),
            KeyCode::Comma => ",".to_string(),
            KeyCode::Period => ".".to_string(),
            KeyCode::Slash => "/".to_string(),
            KeyCode::Backslash => "\\".to_string(),
            KeyCode::Backquote => "`".to_string(),
            KeyCode::BracketLeft => "[".to_string(),
            KeyCode::BracketRight => "]".to_string(),
            KeyCode::Equal => "=".to_string(),
            KeyCode::Minus => "-".to_string(),
            KeyCode::Quote => "'".to_string(),
            KeyCode::Semicolon => ";".to_string(),
            _ => return None,
        };
        Some(name)
    }
}

/// ホストから届く生のキー入力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKeyEvent {
    pub code: KeyCode,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl RawKeyEvent {
    /// 修飾キーなしのキー入力
    pub fn plain(code: KeyCode) -> Self {
        Self { code, alt: false, ctrl: false, meta: false, shift: false }
    }

    /// Ctrl+キー
    pub fn ctrl(code: KeyCode) -> Self {
        Self { ctrl: true, ..Self::plain(code) }
    }

    /// Alt(Meta)+キー
    pub fn alt(code: KeyCode) -> Self {
        Self { alt: true, ..Self::plain(code) }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// 正規化したトークンを返す
    pub fn to_token(&self) -> Option<KeyToken> {
        normalize(self)
    }
}

/// 生のキー入力をキートークンに正規化する。
///
/// 修飾キー単体や未対応のキーでは `None` を返す。
/// 修飾キーは Alt → Ctrl → Meta → Shift の順に、それまでの文字列の前へ付与する。
pub fn normalize(event: &RawKeyEvent) -> Option<KeyToken> {
    if event.code.is_modifier() {
        return None;
    }

    let mut key = event.code.base_name()?;
    if key.chars().count() == 1 {
        key = key.to_lowercase();
    }

    if event.alt {
        key = format!("M-{}", key);
    }
    if event.ctrl {
        key = format!("C-{}", key);
    }
    if event.meta {
        key = format!("CMD-{}", key);
    }
    if event.shift {
        key = format!("S-{}", key);
    }

    Some(KeyToken(key))
}

/// 正規化済みのキー表記。2キーシーケンスは空白1つで連結される。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyToken(String);

const TOKEN_PATTERN: &str = r"(?:(?:M|C|CMD|S)-)*(?:Return|SPC|Tab|Backspace|Delete|Escape|Insert|Up|Down|Left|Right|PageUp|PageDown|Home|End|F(?:[1-9]|1[0-9]|2[0-4])|[^\sA-Z])";

fn sequence_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(&format!("^{p}(?: {p})?$", p = TOKEN_PATTERN))
            .expect("key sequence grammar is a valid regex")
    })
}

impl KeyToken {
    /// 検証せずにトークンを作成（ホストが既に正規化済みの場合）
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// 1キーまたは2キーのシーケンス表記を検証して作成
    pub fn parse(sequence: &str) -> Result<Self, InputError> {
        if sequence_regex().is_match(sequence) {
            Ok(Self(sequence.to_string()))
        } else {
            Err(InputError::InvalidKeySequence { sequence: sequence.to_string() })
        }
    }

    /// プレフィックスと続くキーを連結
    pub fn combine(prefix: &KeyToken, key: &KeyToken) -> Self {
        Self(format!("{} {}", prefix.0, key.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 10進数字1文字のトークンならその文字を返す
    pub fn as_digit(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => Some(c),
            _ => None,
        }
    }

    /// 2キーシーケンスかどうか
    pub fn is_sequence(&self) -> bool {
        self.0.len() > 1 && self.0.contains(' ')
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyToken {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl PartialEq<str> for KeyToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for KeyToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// US配列でShiftを伴う記号を物理キーへ戻す
fn shifted_symbol(c: char) -> Option<KeyCode> {
    let code = match c {
        '<' => KeyCode::Comma,
        '>' => KeyCode::Period,
        '?' => KeyCode::Slash,
        '|' => KeyCode::Backslash,
        '~' => KeyCode::Backquote,
        '{' => KeyCode::BracketLeft,
        '}' => KeyCode::BracketRight,
        '+' => KeyCode::Equal,
        '_' => KeyCode::Minus,
        '"' => KeyCode::Quote,
        ':' => KeyCode::Semicolon,
        '!' => KeyCode::Digit('1'),
        '@' => KeyCode::Digit('2'),
        '#' => KeyCode::Digit('3'),
        '$' => KeyCode::Digit('4'),
        '%' => KeyCode::Digit('5'),
        '^' => KeyCode::Digit('6'),
        '&' => KeyCode::Digit('7'),
        '*' => KeyCode::Digit('8'),
        '(' => KeyCode::Digit('9'),
        ')' => KeyCode::Digit('0'),
        _ => return None,
    };
    Some(code)
}

fn unshifted_char(c: char) -> KeyCode {
    match c {
        ' ' => KeyCode::Space,
        ',' => KeyCode::Comma,
        '.' => KeyCode::Period,
        '/' => KeyCode::Slash,
        '\\' => KeyCode::Backslash,
        '`' => KeyCode::Backquote,
        '[' => KeyCode::BracketLeft,
        ']' => KeyCode::BracketRight,
        '=' => KeyCode::Equal,
        '-' => KeyCode::Minus,
        '\'' => KeyCode::Quote,
        ';' => KeyCode::Semicolon,
        c if c.is_ascii_digit() => KeyCode::Digit(c),
        c if c.is_alphabetic() => KeyCode::Letter(c),
        _ => KeyCode::Unknown,
    }
}

/// crossterm統合
impl From<KeyEvent> for RawKeyEvent {
    fn from(event: KeyEvent) -> Self {
        let mut raw = RawKeyEvent {
            code: KeyCode::Unknown,
            alt: event.modifiers.contains(CrosstermModifiers::ALT),
            ctrl: event.modifiers.contains(CrosstermModifiers::CONTROL),
            meta: event.modifiers.intersects(CrosstermModifiers::SUPER | CrosstermModifiers::META),
            shift: event.modifiers.contains(CrosstermModifiers::SHIFT),
        };

        raw.code = match event.code {
            CrosstermKeyCode::Char(c) => {
                if let Some(code) = shifted_symbol(c) {
                    raw.shift = true;
                    code
                } else {
                    if c.is_uppercase() {
                        raw.shift = true;
                    }
                    unshifted_char(c)
                }
            }
            CrosstermKeyCode::Enter => KeyCode::Enter,
            CrosstermKeyCode::Tab => KeyCode::Tab,
            CrosstermKeyCode::BackTab => {
                raw.shift = true;
                KeyCode::Tab
            }
            CrosstermKeyCode::Backspace => KeyCode::Backspace,
            CrosstermKeyCode::Delete => KeyCode::Delete,
            CrosstermKeyCode::Esc => KeyCode::Escape,
            CrosstermKeyCode::Insert => KeyCode::Insert,
            CrosstermKeyCode::PageUp => KeyCode::PageUp,
            CrosstermKeyCode::PageDown => KeyCode::PageDown,
            CrosstermKeyCode::Home => KeyCode::Home,
            CrosstermKeyCode::End => KeyCode::End,
            CrosstermKeyCode::Up => KeyCode::ArrowUp,
            CrosstermKeyCode::Down => KeyCode::ArrowDown,
            CrosstermKeyCode::Left => KeyCode::ArrowLeft,
            CrosstermKeyCode::Right => KeyCode::ArrowRight,
            CrosstermKeyCode::F(n) => KeyCode::F(n),
            CrosstermKeyCode::Modifier(modifier) => match modifier {
                ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => KeyCode::Shift,
                ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => KeyCode::Control,
                ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => KeyCode::Alt,
                ModifierKeyCode::LeftSuper
                | ModifierKeyCode::RightSuper
                | ModifierKeyCode::LeftMeta
                | ModifierKeyCode::RightMeta => KeyCode::Meta,
                _ => KeyCode::Unknown,
            },
            _ => KeyCode::Unknown,
        };

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(event: RawKeyEvent) -> Option<String> {
        normalize(&event).map(|t| t.as_str().to_string())
    }

    #[test]
    fn test_plain_letters_and_digits() {
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Letter('a'))), Some("a".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Letter('A'))), Some("a".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Digit('4'))), Some("4".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Numpad('7'))), Some("7".into()));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Enter)), Some("Return".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Space)), Some("SPC".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::ArrowUp)), Some("Up".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::ArrowRight)), Some("Right".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::PageDown)), Some("PageDown".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::F(5))), Some("F5".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Backquote)), Some("`".into()));
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Quote)), Some("'".into()));
    }

    #[test]
    fn test_modifier_order() {
        assert_eq!(token(RawKeyEvent::ctrl(KeyCode::Letter('x'))), Some("C-x".into()));
        assert_eq!(token(RawKeyEvent::alt(KeyCode::Letter('g'))), Some("M-g".into()));
        assert_eq!(
            token(RawKeyEvent::alt(KeyCode::Letter('n')).with_ctrl()),
            Some("C-M-n".into())
        );
        assert_eq!(
            token(RawKeyEvent::alt(KeyCode::Period).with_shift()),
            Some("S-M-.".into())
        );
        assert_eq!(
            token(RawKeyEvent::ctrl(KeyCode::Backspace).with_shift()),
            Some("S-C-Backspace".into())
        );
        assert_eq!(
            token(RawKeyEvent::plain(KeyCode::Letter('k')).with_meta().with_ctrl()),
            Some("CMD-C-k".into())
        );
    }

    #[test]
    fn test_modifier_only_and_unknown() {
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Shift)), None);
        assert_eq!(token(RawKeyEvent::ctrl(KeyCode::Control)), None);
        assert_eq!(token(RawKeyEvent::plain(KeyCode::Unknown)), None);
        assert_eq!(token(RawKeyEvent::plain(KeyCode::F(30))), None);
    }

    #[test]
    fn test_crossterm_integration() {
        let raw: RawKeyEvent =
            KeyEvent::new(CrosstermKeyCode::Char('x'), CrosstermModifiers::CONTROL).into();
        assert_eq!(raw, RawKeyEvent::ctrl(KeyCode::Letter('x')));

        let raw: RawKeyEvent =
            KeyEvent::new(CrosstermKeyCode::Char('>'), CrosstermModifiers::ALT).into();
        assert_eq!(token(raw), Some("S-M-.".into()));

        let raw: RawKeyEvent =
            KeyEvent::new(CrosstermKeyCode::Char(' '), CrosstermModifiers::CONTROL).into();
        assert_eq!(token(raw), Some("C-SPC".into()));

        let raw: RawKeyEvent =
            KeyEvent::new(CrosstermKeyCode::Char('A'), CrosstermModifiers::NONE).into();
        assert_eq!(token(raw), Some("S-a".into()));
    }

    #[test]
    fn test_key_sequence_parse() {
        assert!(KeyToken::parse("C-x C-f").is_ok());
        assert!(KeyToken::parse("M-g M-g").is_ok());
        assert!(KeyToken::parse("S-C--").is_ok());
        assert!(KeyToken::parse("C-q Tab").is_ok());
        assert!(KeyToken::parse("C-").is_err());
        assert!(KeyToken::parse("").is_err());
        assert!(KeyToken::parse("C-x C-f g").is_err());
        assert!(KeyToken::parse("C-A").is_err());
    }

    #[test]
    fn test_digit_detection() {
        assert_eq!(KeyToken::new("7").as_digit(), Some('7'));
        assert_eq!(KeyToken::new("C-7").as_digit(), None);
        assert_eq!(KeyToken::new("a").as_digit(), None);
        assert!(KeyToken::combine(&"C-x".into(), &"u".into()).is_sequence());
    }
}
