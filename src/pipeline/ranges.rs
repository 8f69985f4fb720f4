//! Page range parsing

use crate::error::{Error, Result};

/// Parse a page range string into groups of 1-indexed page numbers, one
/// group per comma-separated part, pages in written order.
///
/// Supports:
/// - `N` (single page)
/// - `N-M` (range, reversed when `N > M`)
/// - `z` (last page), `rN` (N-th from last)
/// - `N-M:odd`, `N-M:even` (odd/even filter)
/// - Comma-separated combinations
pub fn parse_page_groups(range: &str, num_pages: u32) -> Result<Vec<Vec<u32>>> {
    if num_pages == 0 {
        return Err(Error::InvalidPageRange {
            range: "document has no pages".to_string(),
        });
    }

    let mut groups = Vec::new();

    for part in range.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        // Check for :odd or :even modifier
        let (range_part, modifier) = if let Some(r) = part.strip_suffix(":odd") {
            (r, Some(1))
        } else if let Some(r) = part.strip_suffix(":even") {
            (r, Some(0))
        } else {
            (part, None)
        };

        let pages: Vec<u32> = match range_part.split_once('-') {
            Some((start, end)) => {
                let start = resolve_page_ref(start, num_pages)?;
                let end = resolve_page_ref(end, num_pages)?;
                if start <= end {
                    (start..=end).collect()
                } else {
                    (end..=start).rev().collect()
                }
            }
            None => vec![resolve_page_ref(range_part, num_pages)?],
        };

        let filtered: Vec<u32> = match modifier {
            Some(parity) => pages.into_iter().filter(|p| p % 2 == parity).collect(),
            None => pages,
        };

        if filtered.is_empty() {
            return Err(Error::InvalidPageRange {
                range: part.to_string(),
            });
        }
        groups.push(filtered);
    }

    if groups.is_empty() {
        return Err(Error::InvalidPageRange {
            range: range.to_string(),
        });
    }

    Ok(groups)
}

/// Resolve a page reference (1-indexed) to a page number.
/// Handles: numeric "N", "z" (last), "rN" (N-th from last)
fn resolve_page_ref(s: &str, num_pages: u32) -> Result<u32> {
    let s = s.trim();
    if s == "z" {
        return Ok(num_pages);
    }
    if let Some(r_num) = s.strip_prefix('r') {
        let n: u32 = r_num.parse().map_err(|_| Error::InvalidPageRange {
            range: s.to_string(),
        })?;
        if n == 0 || n > num_pages {
            return Err(Error::InvalidPageRange {
                range: s.to_string(),
            });
        }
        return Ok(num_pages - n + 1);
    }
    let page: u32 = s.parse().map_err(|_| Error::InvalidPageRange {
        range: s.to_string(),
    })?;
    if page == 0 || page > num_pages {
        return Err(Error::InvalidPageRange {
            range: format!("page {} out of range (1-{})", page, num_pages),
        });
    }
    Ok(page)
}
