use std::collections::HashSet;

/// 列表选择管理
///
/// 选中集合始终是当前展示列表的子集；列表一旦被替换，选择和范围锚点都会清空。
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    /// 当前展示顺序
    items: Vec<String>,
    selected: HashSet<String>,
    /// shift 范围选择的起点
    anchor: Option<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换展示列表（新的查询结果到达）
    pub fn replace_items(&mut self, ids: Vec<String>) {
        self.items = ids;
        self.clear();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// 单击或 shift 单击
    pub fn on_select_change(&mut self, id: &str, selected: bool, shift_key: bool) {
        if shift_key {
            self.range_select(id, selected);
        } else {
            self.toggle(id, selected);
        }
    }

    /// 选中或取消单个条目，并记录为范围锚点
    pub fn toggle(&mut self, id: &str, selected: bool) {
        if !self.items.iter().any(|item| item == id) {
            tracing::debug!("Ignoring selection of {} not in the current list", id);
            return;
        }

        self.anchor = Some(id.to_string());
        if selected {
            self.selected.insert(id.to_string());
        } else {
            self.selected.remove(id);
        }
    }

    /// 用锚点到 `id` 之间（含两端，按展示顺序）的条目替换整个选择
    ///
    /// 没有锚点时从第一个条目开始；`id` 不在列表中时不做任何修改。
    pub fn range_select(&mut self, id: &str, _selected: bool) {
        let Some(target) = self.index_of(id) else {
            tracing::debug!("Ignoring range selection to {} not in the current list", id);
            return;
        };
        let start = self
            .anchor
            .as_deref()
            .and_then(|anchor| self.index_of(anchor))
            .unwrap_or(0);

        let (from, to) = if start <= target { (start, target) } else { (target, start) };
        self.selected = self.items[from..=to].iter().cloned().collect();
    }

    pub fn select_all(&mut self) {
        self.selected = self.items.iter().cloned().collect();
        self.anchor = None;
    }

    pub fn select_none(&mut self) {
        self.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// 以展示顺序返回选中的 id
    pub fn selected_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|id| self.selected.contains(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ids: &[&str]) -> SelectionManager {
        let mut manager = SelectionManager::new();
        manager.replace_items(ids.iter().map(|id| id.to_string()).collect());
        manager
    }

    #[test]
    fn test_range_select_from_anchor() {
        let mut selection = manager(&["a", "b", "c", "d", "e"]);
        selection.toggle("b", true);
        selection.range_select("d", true);
        assert_eq!(selection.selected_ids(), vec!["b", "c", "d"]);
        assert_eq!(selection.anchor(), Some("b"));
    }

    #[test]
    fn test_range_select_backwards_replaces_selection() {
        let mut selection = manager(&["a", "b", "c", "d", "e"]);
        selection.toggle("a", true);
        selection.toggle("d", true);
        selection.on_select_change("b", true, true);
        assert_eq!(selection.selected_ids(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_range_select_without_anchor_starts_at_first_item() {
        let mut selection = manager(&["a", "b", "c", "d"]);
        selection.range_select("c", true);
        assert_eq!(selection.selected_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_range_select_unknown_target_is_noop() {
        let mut selection = manager(&["a", "b", "c"]);
        selection.toggle("b", true);
        selection.range_select("zz", true);
        assert_eq!(selection.selected_ids(), vec!["b"]);
    }

    #[test]
    fn test_toggle_off() {
        let mut selection = manager(&["a", "b"]);
        selection.toggle("a", true);
        selection.toggle("a", false);
        assert!(!selection.is_selected("a"));
        assert_eq!(selection.anchor(), Some("a"));
    }

    #[test]
    fn test_select_all_and_none_clear_anchor() {
        let mut selection = manager(&["a", "b", "c"]);
        selection.toggle("b", true);
        selection.select_all();
        assert_eq!(selection.selected_count(), 3);
        assert_eq!(selection.anchor(), None);

        selection.toggle("c", true);
        selection.select_none();
        assert_eq!(selection.selected_count(), 0);
        assert_eq!(selection.anchor(), None);
    }

    #[test]
    fn test_replace_items_resets_selection() {
        let mut selection = manager(&["a", "b", "c"]);
        selection.toggle("a", true);
        selection.range_select("c", true);

        selection.replace_items(vec!["a".to_string(), "x".to_string()]);
        assert_eq!(selection.selected_count(), 0);
        assert_eq!(selection.anchor(), None);

        // 旧锚点不会延续到新列表
        selection.range_select("x", true);
        assert_eq!(selection.selected_ids(), vec!["a", "x"]);
    }
}
