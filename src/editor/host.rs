//! ホストエディタとの境界
//!
//! キー処理コアが利用するエディタ操作の最小集合。位置は1始まりの行・列。

use std::cmp::Ordering;

/// 行・列（どちらも1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// 正規化済みの範囲（start <= end）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// 2点から範囲を作成（順不同）
    pub fn from_positions(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// 空の範囲
    pub fn collapsed(position: Position) -> Self {
        Self { start: position, end: position }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// 選択方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    /// アンカーが前
    Ltr,
    /// アンカーが後ろ
    Rtl,
}

/// アンカーとカーソル位置からなる選択範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn from_positions(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub fn collapsed(position: Position) -> Self {
        Self { anchor: position, active: position }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    pub fn direction(&self) -> SelectionDirection {
        match self.anchor.cmp(&self.active) {
            Ordering::Greater => SelectionDirection::Rtl,
            _ => SelectionDirection::Ltr,
        }
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn range(&self) -> Range {
        Range::from_positions(self.anchor, self.active)
    }

    /// アンカーとカーソルを入れ替えた選択
    pub fn inverted(&self) -> Self {
        Self { anchor: self.active, active: self.anchor }
    }
}

/// テキスト編集1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub text: String,
    /// 挿入位置にあるカーソルを挿入テキストの後ろへ移動させる
    pub force_move_markers: bool,
}

impl TextEdit {
    pub fn delete(range: Range) -> Self {
        Self { range, text: String::new(), force_move_markers: false }
    }

    pub fn insert(position: Position, text: impl Into<String>) -> Self {
        Self { range: Range::collapsed(position), text: text.into(), force_move_markers: true }
    }

    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self { range, text: text.into(), force_move_markers: true }
    }
}

/// 表示中の行範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start_line: usize,
    pub end_line: usize,
}

/// カーソルが表示領域のどこにあるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorVisibility {
    Visible,
    /// 表示領域より上
    Above,
    /// 表示領域より下
    Below,
}

/// インデント設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabOptions {
    pub tab_size: usize,
    pub insert_spaces: bool,
}

impl Default for TabOptions {
    fn default() -> Self {
        Self { tab_size: 4, insert_spaces: true }
    }
}

/// ホストエディタが提供する操作
pub trait EditorHost {
    /// カーソル位置
    fn position(&self) -> Position {
        self.selection().active
    }

    fn set_position(&mut self, position: Position) {
        self.set_selection(Selection::collapsed(position));
    }

    /// 主選択範囲
    fn selection(&self) -> Selection;

    fn set_selection(&mut self, selection: Selection);

    /// 全選択範囲（マルチカーソル）
    fn selections(&self) -> Vec<Selection> {
        vec![self.selection()]
    }

    fn line_count(&self) -> usize;

    /// 行の文字数（改行を含まない）
    fn line_length(&self, line: usize) -> usize;

    fn eol(&self) -> &str {
        "\n"
    }

    fn text_in_range(&self, range: Range) -> String;

    fn execute_edits(&mut self, edits: &[TextEdit]);

    /// 名前付き組み込みアクションを実行
    fn trigger(&mut self, action: &str);

    fn visible_ranges(&self) -> Vec<LineRange>;

    fn cursor_visibility(&self) -> CursorVisibility {
        CursorVisibility::Visible
    }

    fn reveal_range_in_center(&mut self, range: Range);

    fn reveal_range_at_top(&mut self, range: Range);

    fn tab_options(&self) -> TabOptions {
        TabOptions::default()
    }

    /// プロンプト終了後にフォーカスを戻す
    fn focus(&mut self) {}

    /// ブロックカーソル表示の切り替え
    fn set_block_cursor(&mut self, _enabled: bool) {}
}
