//! インメモリのホストエディタ
//!
//! 行ベースの簡易テキストモデル。テストやヘッドレス利用のために
//! `EditorHost` を実装し、主要な組み込みアクションを解釈する。

use super::host::{
    CursorVisibility, EditorHost, LineRange, Position, Range, Selection, TabOptions, TextEdit,
};

const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

type Snapshot = (Vec<String>, Selection);

/// 行ベースのテキストモデル
#[derive(Debug, Clone)]
pub struct TextModel {
    lines: Vec<String>,
    selection: Selection,
    viewport_top: usize,
    viewport_height: usize,
    tab_options: TabOptions,
    triggered: Vec<String>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    focus_count: usize,
    block_cursor: bool,
}

impl Default for TextModel {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextModel {
    /// テキストからモデルを作成（カーソルは先頭）
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(String::from).collect(),
            selection: Selection::collapsed(Position::new(1, 1)),
            viewport_top: 1,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            tab_options: TabOptions::default(),
            triggered: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            focus_count: 0,
            block_cursor: false,
        }
    }

    pub fn with_viewport_height(mut self, height: usize) -> Self {
        self.viewport_height = height.max(1);
        self
    }

    pub fn with_tab_options(mut self, options: TabOptions) -> Self {
        self.tab_options = options;
        self
    }

    /// 全テキスト
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// 実行された組み込みアクションの履歴
    pub fn triggered(&self) -> &[String] {
        &self.triggered
    }

    pub fn clear_triggered(&mut self) {
        self.triggered.clear();
    }

    /// 表示先頭行を変更する（スクロール）
    pub fn scroll_to(&mut self, top_line: usize) {
        self.viewport_top = top_line.clamp(1, self.lines.len());
    }

    pub fn viewport_top(&self) -> usize {
        self.viewport_top
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count
    }

    pub fn is_block_cursor(&self) -> bool {
        self.block_cursor
    }

    fn viewport_bottom(&self) -> usize {
        (self.viewport_top + self.viewport_height - 1).min(self.lines.len())
    }

    fn len_chars(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count() + 1).sum::<usize>() - 1
    }

    fn clamp(&self, position: Position) -> Position {
        let line = position.line.clamp(1, self.lines.len());
        let column = position.column.clamp(1, self.line_length(line) + 1);
        Position::new(line, column)
    }

    fn offset_of(&self, position: Position) -> usize {
        let position = self.clamp(position);
        let before: usize = self.lines[..position.line - 1]
            .iter()
            .map(|l| l.chars().count() + 1)
            .sum();
        before + position.column - 1
    }

    fn position_of(&self, offset: usize) -> Position {
        let mut remaining = offset;
        for (idx, line) in self.lines.iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                return Position::new(idx + 1, remaining + 1);
            }
            remaining -= len + 1;
        }
        let last = self.lines.len();
        Position::new(last, self.line_length(last) + 1)
    }

    fn apply_edit(&mut self, edit: &TextEdit) {
        let start = self.offset_of(edit.range.start);
        let end = self.offset_of(edit.range.end);
        let inserted = edit.text.chars().count();

        let chars: Vec<char> = self.text().chars().collect();
        let mut text: String = chars[..start].iter().collect();
        text.push_str(&edit.text);
        text.extend(chars[end..].iter());

        let anchor = self.offset_of(self.selection.anchor);
        let active = self.offset_of(self.selection.active);
        let track = |p: usize| -> usize {
            if p < start {
                p
            } else if p > end {
                p - (end - start) + inserted
            } else if edit.force_move_markers || (p == end && start != end) {
                start + inserted
            } else {
                start
            }
        };
        let (anchor, active) = (track(anchor), track(active));

        self.lines = text.split('\n').map(String::from).collect();
        self.selection =
            Selection::from_positions(self.position_of(anchor), self.position_of(active));
    }

    fn snapshot(&self) -> Snapshot {
        (self.lines.clone(), self.selection)
    }

    fn move_active(&mut self, target: Position, select: bool) {
        let target = self.clamp(target);
        self.selection = if select {
            Selection::from_positions(self.selection.anchor, target)
        } else {
            Selection::collapsed(target)
        };
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn word_right(&self, from: usize) -> usize {
        let chars: Vec<char> = self.text().chars().collect();
        let mut offset = from;
        while offset < chars.len() && !Self::is_word_char(chars[offset]) {
            offset += 1;
        }
        while offset < chars.len() && Self::is_word_char(chars[offset]) {
            offset += 1;
        }
        offset
    }

    fn word_left(&self, from: usize) -> usize {
        let chars: Vec<char> = self.text().chars().collect();
        let mut offset = from;
        while offset > 0 && !Self::is_word_char(chars[offset - 1]) {
            offset -= 1;
        }
        while offset > 0 && Self::is_word_char(chars[offset - 1]) {
            offset -= 1;
        }
        offset
    }

    fn cursor_action(&mut self, motion: &str, select: bool) -> bool {
        let active = self.selection.active;
        let offset = self.offset_of(active);
        let last_line = self.lines.len();

        let target = match motion {
            "Up" => Position::new(active.line.saturating_sub(1).max(1), active.column),
            "Down" => Position::new((active.line + 1).min(last_line), active.column),
            "Left" => self.position_of(offset.saturating_sub(1)),
            "Right" => self.position_of((offset + 1).min(self.len_chars())),
            "Home" => Position::new(active.line, 1),
            "End" => Position::new(active.line, self.line_length(active.line) + 1),
            "Top" => Position::new(1, 1),
            "Bottom" => Position::new(last_line, self.line_length(last_line) + 1),
            "WordLeft" => self.position_of(self.word_left(offset)),
            "WordRight" => self.position_of(self.word_right(offset)),
            "PageDown" => {
                let line = (active.line + self.viewport_height).min(last_line);
                Position::new(line, active.column)
            }
            "PageUp" => {
                let line = active.line.saturating_sub(self.viewport_height).max(1);
                Position::new(line, active.column)
            }
            _ => return false,
        };

        self.move_active(target, select);
        true
    }

    fn delete_all_right(&mut self) {
        if !self.selection.is_empty() {
            let range = self.selection.range();
            self.execute_edits(&[TextEdit::delete(range)]);
            return;
        }

        let active = self.selection.active;
        let line_end = Position::new(active.line, self.line_length(active.line) + 1);
        let end = if active == line_end && active.line < self.lines.len() {
            Position::new(active.line + 1, 1)
        } else {
            line_end
        };

        if end != active {
            self.execute_edits(&[TextEdit::delete(Range::from_positions(active, end))]);
        }
    }

    fn delete_char(&mut self, forward: bool) {
        let offset = self.offset_of(self.selection.active);
        let (start, end) = if forward {
            (offset, (offset + 1).min(self.len_chars()))
        } else {
            (offset.saturating_sub(1), offset)
        };
        if start != end {
            let range = Range::from_positions(self.position_of(start), self.position_of(end));
            self.execute_edits(&[TextEdit::delete(range)]);
        }
    }

    fn insert_line_after(&mut self) {
        let line = self.selection.active.line;
        let line_end = Position::new(line, self.line_length(line) + 1);
        self.execute_edits(&[TextEdit::insert(line_end, "\n")]);
        self.set_position(Position::new(line + 1, 1));
    }

    fn delete_line(&mut self) {
        let line = self.selection.active.line;
        let range = if line < self.lines.len() {
            Range::from_positions(Position::new(line, 1), Position::new(line + 1, 1))
        } else if line > 1 {
            Range::from_positions(
                Position::new(line - 1, self.line_length(line - 1) + 1),
                Position::new(line, self.line_length(line) + 1),
            )
        } else {
            Range::from_positions(Position::new(1, 1), Position::new(1, self.line_length(1) + 1))
        };
        self.execute_edits(&[TextEdit::delete(range)]);
        let line = self.selection.active.line;
        self.set_position(Position::new(line, 1));
    }

    fn undo(&mut self) {
        if let Some(snapshot) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            (self.lines, self.selection) = snapshot;
        }
    }

    fn redo(&mut self) {
        if let Some(snapshot) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            (self.lines, self.selection) = snapshot;
        }
    }
}

impl EditorHost for TextModel {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection =
            Selection::from_positions(self.clamp(selection.anchor), self.clamp(selection.active));
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_length(&self, line: usize) -> usize {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map_or(0, |l| l.chars().count())
    }

    fn text_in_range(&self, range: Range) -> String {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end);
        self.text().chars().skip(start).take(end.saturating_sub(start)).collect()
    }

    fn execute_edits(&mut self, edits: &[TextEdit]) {
        if edits.is_empty() {
            return;
        }

        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();

        let mut ordered: Vec<&TextEdit> = edits.iter().collect();
        ordered.sort_by(|a, b| b.range.start.cmp(&a.range.start));
        for edit in ordered {
            self.apply_edit(edit);
        }
    }

    fn trigger(&mut self, action: &str) {
        self.triggered.push(action.to_string());

        if let Some(motion) = action.strip_prefix("cursor") {
            let (motion, select) = match motion.strip_suffix("Select") {
                Some(motion) => (motion, true),
                None => (motion, false),
            };
            if self.cursor_action(motion, select) {
                return;
            }
        }

        match action {
            "deleteAllRight" => self.delete_all_right(),
            "deleteLeft" => self.delete_char(false),
            "deleteRight" => self.delete_char(true),
            "editor.action.insertLineAfter" => self.insert_line_after(),
            "editor.action.deleteLines" => self.delete_line(),
            "editor.action.selectAll" => {
                let last = self.lines.len();
                self.selection = Selection::from_positions(
                    Position::new(1, 1),
                    Position::new(last, self.line_length(last) + 1),
                );
            }
            "scrollPageUp" => {
                self.viewport_top = self.viewport_top.saturating_sub(self.viewport_height).max(1);
            }
            "undo" => self.undo(),
            "redo" => self.redo(),
            _ => {}
        }
    }

    fn visible_ranges(&self) -> Vec<LineRange> {
        vec![LineRange { start_line: self.viewport_top, end_line: self.viewport_bottom() }]
    }

    fn cursor_visibility(&self) -> CursorVisibility {
        let line = self.selection.active.line;
        if line < self.viewport_top {
            CursorVisibility::Above
        } else if line > self.viewport_bottom() {
            CursorVisibility::Below
        } else {
            CursorVisibility::Visible
        }
    }

    fn reveal_range_in_center(&mut self, range: Range) {
        let top = range.start.line.saturating_sub(self.viewport_height / 2).max(1);
        self.scroll_to(top);
    }

    fn reveal_range_at_top(&mut self, range: Range) {
        self.scroll_to(range.start.line);
    }

    fn tab_options(&self) -> TabOptions {
        self.tab_options
    }

    fn focus(&mut self) {
        self.focus_count += 1;
    }

    fn set_block_cursor(&mut self, enabled: bool) {
        self.block_cursor = enabled;
    }
}
