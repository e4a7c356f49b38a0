use std::num::IntErrorKind;
use std::ops::Range;

use serde::Serialize;

/// A resolved 1-based page over a list of `page_size` chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: usize,
    pub offset: usize,
    pub page_count: usize,
    pub page_size: usize,
}

impl Page {
    /// Slice bounds of this page within `total_items`
    pub fn range(&self, total_items: usize) -> Range<usize> {
        let start = self.offset.min(total_items);
        let end = (self.offset + self.page_size).min(total_items);
        start..end
    }
}

/// Resolves the requested page. Unparseable or missing input means page 1,
/// and the result is always clamped into `1..=max(page_count, 1)`.
pub fn paginate(total_items: usize, page_param: Option<&str>, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let page_count = total_items.div_ceil(page_size);

    let last = page_count.max(1);
    let page = match page_param.map(|raw| raw.trim().parse::<i64>()) {
        None => 1,
        Some(Ok(requested)) if requested < 1 => 1,
        Some(Ok(requested)) => usize::try_from(requested).map_or(last, |p| p.min(last)),
        // Out-of-range numbers still clamp to the nearest bound
        Some(Err(e)) => match e.kind() {
            IntErrorKind::PosOverflow => last,
            _ => 1,
        },
    };

    Page {
        page,
        offset: (page - 1) * page_size,
        page_count,
        page_size,
    }
}
