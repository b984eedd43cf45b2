//! キルリング実装

use std::collections::VecDeque;

/// デフォルトの最大保持数
pub const DEFAULT_CAPACITY: usize = 50;

/// Emacs風キルリング。
///
/// 末尾（back）が最新のエントリ。容量を超えると最古のエントリから捨てる。
#[derive(Debug, Clone)]
pub struct KillRing {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new()
    }
}

impl KillRing {
    /// 新しいキルリングを作成
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 最大保持数を設定（0は1として扱う）
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 文字列を最新エントリとして追加
    pub fn add(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("kill ring add ({} chars)", text.chars().count());
        self.entries.push_back(text);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// 連続キル用の追記。
    ///
    /// リングが空のときだけ `text` を追加し、同じエントリへもう一度 `text` を
    /// 連結する。空でないリングには何もしない。
    pub fn grow_top(&mut self, text: &str) {
        if !self.entries.is_empty() {
            return;
        }

        self.add(text);
        if let Some(top) = self.entries.back_mut() {
            top.push_str(text);
        }
    }

    /// 先頭から `n` 番目（1始まり、上限1）のエントリ。空なら空文字列。
    pub fn get(&self, n: Option<usize>) -> String {
        let offset = n.filter(|n| *n > 0).map_or(1, |n| n.min(1));
        self.entries
            .len()
            .checked_sub(offset)
            .and_then(|index| self.entries.get(index))
            .cloned()
            .unwrap_or_default()
    }

    /// 2件以上あれば最新エントリを取り出して返す。1件以下なら変更せずに `get` を返す。
    pub fn pop(&mut self) -> String {
        if self.entries.len() > 1 {
            return self.entries.pop_back().unwrap_or_default();
        }

        self.get(None)
    }

    /// 古い順のエントリ
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// エントリをクリア
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get_top() {
        let mut ring = KillRing::new();
        ring.add("foo");
        ring.add("bar");
        assert_eq!(ring.get(None), "bar");
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn get_on_empty_ring_is_empty_string() {
        let ring = KillRing::new();
        assert_eq!(ring.get(None), "");
        assert_eq!(ring.get(Some(3)), "");
    }

    #[test]
    fn get_clamps_offset_to_top() {
        let mut ring = KillRing::new();
        ring.add("first");
        ring.add("second");
        ring.add("third");
        assert_eq!(ring.get(Some(0)), "third");
        assert_eq!(ring.get(Some(1)), "third");
        assert_eq!(ring.get(Some(5)), "third");
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut ring = KillRing::new();
        for i in 0..60 {
            ring.add(format!("entry-{}", i));
        }

        assert_eq!(ring.len(), 50);
        let entries: Vec<&str> = ring.entries().collect();
        assert_eq!(entries.first(), Some(&"entry-10"));
        assert_eq!(entries.last(), Some(&"entry-59"));
    }

    #[test]
    fn pop_keeps_single_entry() {
        let mut ring = KillRing::new();
        ring.add("only");
        assert_eq!(ring.pop(), "only");
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn pop_removes_top() {
        let mut ring = KillRing::new();
        ring.add("first");
        ring.add("second");
        assert_eq!(ring.pop(), "second");
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get(None), "first");
        assert_eq!(ring.pop(), "first");
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn pop_on_empty_ring() {
        let mut ring = KillRing::new();
        assert_eq!(ring.pop(), "");
        assert!(ring.is_empty());
    }

    #[test]
    fn grow_top_on_empty_ring_doubles_text() {
        let mut ring = KillRing::new();
        ring.grow_top("line\n");
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get(None), "line\nline\n");
    }

    #[test]
    fn grow_top_on_non_empty_ring_is_noop() {
        let mut ring = KillRing::new();
        ring.add("first");
        ring.grow_top("more");
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get(None), "first");
    }

    #[test]
    fn clear_resets_entries() {
        let mut ring = KillRing::with_capacity(3);
        ring.add("data");
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 3);
    }
}
