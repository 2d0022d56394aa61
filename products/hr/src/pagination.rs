//! Page-number window for the pagination control.

const MAX_PAGES_WITHOUT_ELLIPSIS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageToken {
    Page(u32),
    Ellipsis,
}

/// Tokens to render for `current` out of `total_pages`.
///
/// Empty when there is at most one page. Up to five pages are shown
/// in full; beyond that the first and last page are always present, a
/// three-page window follows the current page, and each gap collapses
/// into one ellipsis.
pub fn page_tokens(current: u32, total_pages: u32) -> Vec<PageToken> {
    if total_pages <= 1 {
        return Vec::new();
    }
    if total_pages <= MAX_PAGES_WITHOUT_ELLIPSIS {
        return (1..=total_pages).map(PageToken::Page).collect();
    }

    let last = total_pages;
    let mut start = current.saturating_sub(1).max(2);
    let mut end = current.saturating_add(1).min(last - 1);
    if start == 2 {
        end = 4.min(last - 1);
    } else if end == last - 1 {
        start = last.saturating_sub(3).max(2);
    }

    let mut tokens = vec![PageToken::Page(1)];
    if start > 2 {
        tokens.push(PageToken::Ellipsis);
    }
    tokens.extend((start..=end).map(PageToken::Page));
    if end < last - 1 {
        tokens.push(PageToken::Ellipsis);
    }
    tokens.push(PageToken::Page(last));
    tokens
}

pub fn previous_page(current: u32) -> u32 {
    current.saturating_sub(1).max(1)
}

pub fn next_page(current: u32, total_pages: u32) -> u32 {
    current.saturating_add(1).min(total_pages.max(1))
}

/// Clamp an arbitrary requested page into `[1, total_pages]`.
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.clamp(1, total_pages.max(1))
}
