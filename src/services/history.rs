/// 浏览器地址栏的抽象
///
/// 只需要读取当前查询字符串和原地替换当前历史记录。
pub trait HistoryLocation: Send {
    /// 当前查询字符串，可能带 `?` 前缀
    fn search(&self) -> String;

    /// 替换当前历史记录的查询字符串（不新增记录）
    fn replace(&mut self, search: &str);
}

/// 内存中的历史记录，用于命令行和测试
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    entries: Vec<String>,
}

impl MemoryLocation {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            entries: vec![normalize(&search.into())],
        }
    }

    /// 模拟用户导航，新增一条记录
    pub fn push(&mut self, search: &str) {
        self.entries.push(normalize(search));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl HistoryLocation for MemoryLocation {
    fn search(&self) -> String {
        self.entries.last().cloned().unwrap_or_default()
    }

    fn replace(&mut self, search: &str) {
        let search = normalize(search);
        match self.entries.last_mut() {
            Some(current) => *current = search,
            None => self.entries.push(search),
        }
    }
}

fn normalize(search: &str) -> String {
    search.trim_start_matches('?').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_history_length() {
        let mut location = MemoryLocation::new("?p=2");
        assert_eq!(location.search(), "p=2");

        location.replace("p=3");
        location.replace("?p=4");
        assert_eq!(location.len(), 1);
        assert_eq!(location.search(), "p=4");

        location.push("p=1");
        assert_eq!(location.entries(), &["p=4".to_string(), "p=1".to_string()]);
    }
}
