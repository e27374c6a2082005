//! Two-page spread arithmetic
//!
//! Spreads start on odd pages: the spread at `L` shows `L` on the left and
//! `L + 1` on the right when that page exists. A trailing page without a
//! partner forms a singular spread.

/// Start of the last spread in a document of `total_pages`
pub fn last_spread_start(total_pages: u32) -> u32 {
    match total_pages {
        0 => 1,
        p if p % 2 == 1 => p,
        p => p - 1,
    }
}

/// Start of the spread containing page `n`, clamped to the document
pub fn spread_start(n: u32, total_pages: u32) -> u32 {
    let clamped = n.clamp(1, total_pages.max(1));
    if clamped % 2 == 0 { clamped - 1 } else { clamped }
}

/// Right-hand partner of the spread starting at `left`, if the document has one
pub fn right_partner(left: u32, total_pages: u32) -> Option<u32> {
    let right = left + 1;
    (right <= total_pages).then_some(right)
}

/// Pages visible in the spread starting at `left`
pub fn visible_pages(left: u32, total_pages: u32) -> (u32, Option<u32>) {
    (left, right_partner(left, total_pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_spread_is_odd() {
        assert_eq!(last_spread_start(1), 1);
        assert_eq!(last_spread_start(2), 1);
        assert_eq!(last_spread_start(5), 5);
        assert_eq!(last_spread_start(10), 9);
    }

    #[test]
    fn even_pages_align_down() {
        assert_eq!(spread_start(4, 10), 3);
        assert_eq!(spread_start(7, 10), 7);
        assert_eq!(spread_start(0, 10), 1);
        assert_eq!(spread_start(42, 10), 9);
    }

    #[test]
    fn trailing_page_is_singular() {
        assert_eq!(visible_pages(5, 5), (5, None));
        assert_eq!(visible_pages(3, 5), (3, Some(4)));
    }
}
