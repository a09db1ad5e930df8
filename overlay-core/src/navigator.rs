//! Page navigation.

use serde::{Deserialize, Serialize};

/// Current page of a paginated document.
///
/// `current < total` holds whenever `total > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageNavigator {
    current: usize,
    total: usize,
}

impl PageNavigator {
    /// Navigator positioned on the first page.
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Zero-based current page.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Page count.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Move by `delta` pages.
    ///
    /// Returns the new page, or `None` when the target would leave
    /// `[0, total)`; the current page is then unchanged.
    pub fn advance(&mut self, delta: i64) -> Option<usize> {
        if delta == 0 {
            return None;
        }
        let current = i64::try_from(self.current).ok()?;
        let target = usize::try_from(current.checked_add(delta)?).ok()?;
        if target >= self.total {
            return None;
        }
        self.current = target;
        Some(target)
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn can_go_forward(&self) -> bool {
        self.current + 1 < self.total
    }

    /// One-based indicator such as `"2/5"`; `"0/0"` without pages.
    #[must_use]
    pub fn label(&self) -> String {
        if self.total == 0 {
            return "0/0".to_string();
        }
        format!("{}/{}", self.current + 1, self.total)
    }

    /// Start over on page 0 of a document with `total` pages.
    pub fn reset(&mut self, total: usize) {
        *self = Self::new(total);
    }
}
