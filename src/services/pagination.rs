use serde::Serialize;

/// 分页按钮窗口
///
/// 纯派生值：相同的输入总是得到相同的窗口，`current_page` 已被夹到合法范围内。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationWindow {
    pub pages: Vec<u32>,
    pub total_pages: u32,
    pub current_page: u32,
}

impl PaginationWindow {
    /// 计算分页窗口
    ///
    /// # 参数
    /// - `total_items`: 结果总数
    /// - `current_page`: 当前页（从 1 开始）
    /// - `items_per_page`: 每页条数，0 按 1 处理
    /// - `budget`: 最多显示的页码按钮数，0 按 1 处理
    pub fn compute(total_items: u64, current_page: u32, items_per_page: u32, budget: usize) -> Self {
        let per_page = u64::from(items_per_page.max(1));
        let total_pages = total_items.div_ceil(per_page).max(1);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        let current_page = current_page.clamp(1, total_pages);
        let budget = u32::try_from(budget.max(1)).unwrap_or(u32::MAX);

        let (start, end) = if total_pages <= budget {
            (1, total_pages)
        } else {
            let half = budget / 2;
            if current_page <= half + 1 {
                (1, budget)
            } else if current_page + (budget - half - 1) >= total_pages {
                (total_pages - budget + 1, total_pages)
            } else {
                (current_page - half, current_page + (budget - half - 1))
            }
        };

        Self {
            pages: (start..=end).collect(),
            total_pages,
            current_page,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

impl Default for PaginationWindow {
    fn default() -> Self {
        Self {
            pages: vec![1],
            total_pages: 1,
            current_page: 1,
        }
    }
}

/// 按视口宽度决定显示多少个页码按钮
pub fn pages_to_display(viewport_width: u32) -> usize {
    match viewport_width {
        0..=575 => 4,
        576..=991 => 7,
        _ => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_result_shows_all_pages() {
        let window = PaginationWindow::compute(95, 3, 20, 10);
        assert_eq!(window.total_pages, 5);
        assert_eq!(window.pages, vec![1, 2, 3, 4, 5]);
        assert_eq!(window.current_page, 3);
    }

    #[test]
    fn test_window_centered_on_current_page() {
        let window = PaginationWindow::compute(1000, 25, 20, 10);
        assert_eq!(window.total_pages, 50);
        assert_eq!(window.pages, (20..=29).collect::<Vec<_>>());
        assert_eq!(window.current_page, 25);
    }

    #[test]
    fn test_window_pinned_to_edges() {
        let start = PaginationWindow::compute(1000, 6, 20, 10);
        assert_eq!(start.pages, (1..=10).collect::<Vec<_>>());

        let end = PaginationWindow::compute(1000, 47, 20, 10);
        assert_eq!(end.pages, (41..=50).collect::<Vec<_>>());

        let odd_budget = PaginationWindow::compute(1000, 25, 20, 7);
        assert_eq!(odd_budget.pages, (22..=28).collect::<Vec<_>>());
    }

    #[test]
    fn test_current_page_clamped() {
        let window = PaginationWindow::compute(50, 50, 20, 10);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.current_page, 3);

        let window = PaginationWindow::compute(50, 0, 20, 10);
        assert_eq!(window.current_page, 1);
        assert!(!window.has_previous());
        assert!(window.has_next());
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let window = PaginationWindow::compute(0, 4, 40, 10);
        assert_eq!(window, PaginationWindow::default());
    }

    #[test]
    fn test_degenerate_inputs() {
        let window = PaginationWindow::compute(5, 2, 0, 0);
        assert_eq!(window.total_pages, 5);
        assert_eq!(window.pages, vec![2]);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let first = PaginationWindow::compute(777, 13, 40, 7);
        let second = PaginationWindow::compute(777, first.current_page, 40, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_pages_to_display() {
        assert!(pages_to_display(320) < pages_to_display(800));
        assert!(pages_to_display(800) < pages_to_display(1920));
    }
}
