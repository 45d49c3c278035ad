//! Screen geometry.
//!
//! Stacks the five regions (dividers, entry, notices, statusbar, tabbar)
//! vertically in the configured order inside an optional border. The
//! notices region takes whatever the others leave. Computation is pure
//! given a size; `compute` wraps it with size probes before and after and
//! retries when the terminal was resized in between.

use std::io;

use ratatui::layout::Rect;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_LAYOUT_ATTEMPTS: usize = 8;

/// Entry rows used when the server reports no length limit.
const UNLIMITED_ENTRY_ROWS: usize = 3;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("terminal kept resizing during layout ({attempts} attempts)")]
    Race { attempts: usize },
    #[error("terminal too small ({cols}x{rows})")]
    TooSmall { cols: u16, rows: u16 },
    #[error("failed to read terminal size: {0}")]
    Probe(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Divider,
    Entry,
    Notices,
    Statusbar,
    Tabbar,
}

impl Region {
    pub const REQUIRED: [Region; 4] = [
        Region::Entry,
        Region::Notices,
        Region::Statusbar,
        Region::Tabbar,
    ];

    pub fn parse(name: &str) -> Option<Region> {
        match name.trim().to_lowercase().as_str() {
            "divider" => Some(Region::Divider),
            "entry" => Some(Region::Entry),
            "notices" => Some(Region::Notices),
            "statusbar" => Some(Region::Statusbar),
            "tabbar" => Some(Region::Tabbar),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Divider => "divider",
            Region::Entry => "entry",
            Region::Notices => "notices",
            Region::Statusbar => "statusbar",
            Region::Tabbar => "tabbar",
        }
    }
}

pub fn default_order() -> Vec<Region> {
    vec![
        Region::Divider,
        Region::Entry,
        Region::Divider,
        Region::Notices,
        Region::Statusbar,
        Region::Tabbar,
    ]
}

/// Parse configured region names. Repeated non-divider regions keep only
/// their last position; missing ones are appended.
pub fn normalize_order(names: &[String]) -> Vec<Region> {
    let parsed: Vec<Region> = names
        .iter()
        .filter_map(|name| {
            let region = Region::parse(name);
            if region.is_none() {
                warn!(region = %name, "ignoring unknown ui_order entry");
            }
            region
        })
        .collect();

    let mut order: Vec<Region> = parsed
        .iter()
        .enumerate()
        .filter(|(i, region)| {
            **region == Region::Divider || !parsed[i + 1..].contains(region)
        })
        .map(|(_, region)| *region)
        .collect();
    for region in Region::REQUIRED {
        if !order.contains(&region) {
            order.push(region);
        }
    }
    order
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub cols: u16,
    pub rows: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutInput {
    pub bordered: bool,
    pub order: Vec<Region>,
    /// Longest notice the server accepts (or the user override); 0 if unlimited.
    pub notice_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLayout {
    pub size: TermSize,
    pub border: Option<Rect>,
    pub entry: Rect,
    pub notices: Rect,
    pub statusbar: Rect,
    pub tabbar: Rect,
    pub dividers: Vec<Rect>,
}

/// Inset a rect horizontally by padding on both sides.
pub fn inset_horizontal(area: Rect, padding: u16) -> Rect {
    if area.width <= padding * 2 {
        return area;
    }
    Rect {
        x: area.x + padding,
        width: area.width - padding * 2,
        ..area
    }
}

fn inset(area: Rect) -> Rect {
    if area.width < 2 || area.height < 2 {
        return Rect { width: 0, height: 0, ..area };
    }
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width - 2,
        height: area.height - 2,
    }
}

/// Rows for the entry region: one per full line of the longest notice,
/// plus one, never more than half the available height.
pub fn entry_height(notice_length: usize, width: u16, available: u16) -> u16 {
    let natural = if notice_length == 0 {
        UNLIMITED_ENTRY_ROWS
    } else {
        notice_length / usize::from(width.max(1)) + 1
    };
    let cap = usize::from((available / 2).max(1));
    natural.min(cap) as u16
}

pub fn compute_for_size(size: TermSize, input: &LayoutInput) -> Result<ScreenLayout, LayoutError> {
    let area = Rect::new(0, 0, size.cols, size.rows);
    let (border, inner) = if input.bordered {
        (Some(area), inset_horizontal(inset(area), 1))
    } else {
        (None, area)
    };

    let available = inner.height;
    let entry_rows = entry_height(input.notice_length, inner.width, available);
    let dividers = input
        .order
        .iter()
        .filter(|region| **region == Region::Divider)
        .count() as u16;
    let fixed = entry_rows + 1 + 1 + dividers;
    if inner.width == 0 || available <= fixed {
        return Err(LayoutError::TooSmall {
            cols: size.cols,
            rows: size.rows,
        });
    }
    let notice_rows = available - fixed;

    let mut layout = ScreenLayout {
        size,
        border,
        entry: Rect::default(),
        notices: Rect::default(),
        statusbar: Rect::default(),
        tabbar: Rect::default(),
        dividers: Vec::new(),
    };
    let mut y = inner.y;
    for region in &input.order {
        let height = match region {
            Region::Divider | Region::Statusbar | Region::Tabbar => 1,
            Region::Entry => entry_rows,
            Region::Notices => notice_rows,
        };
        let rect = Rect::new(inner.x, y, inner.width, height);
        y += height;
        match region {
            Region::Divider => layout.dividers.push(rect),
            Region::Entry => layout.entry = rect,
            Region::Notices => layout.notices = rect,
            Region::Statusbar => layout.statusbar = rect,
            Region::Tabbar => layout.tabbar = rect,
        }
    }
    Ok(layout)
}

/// Compute against the live terminal size, retrying from scratch when the
/// size changes while computing.
pub fn compute<P>(mut probe: P, input: &LayoutInput) -> Result<ScreenLayout, LayoutError>
where
    P: FnMut() -> io::Result<TermSize>,
{
    for attempt in 1..=MAX_LAYOUT_ATTEMPTS {
        let before = probe()?;
        let layout = compute_for_size(before, input)?;
        let after = probe()?;
        if before == after {
            debug!(cols = before.cols, rows = before.rows, attempt, "layout computed");
            return Ok(layout);
        }
        debug!(attempt, "terminal resized during layout, retrying");
    }
    Err(LayoutError::Race {
        attempts: MAX_LAYOUT_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn input(order: Vec<Region>, bordered: bool, notice_length: usize) -> LayoutInput {
        LayoutInput {
            bordered,
            order,
            notice_length,
        }
    }

    #[test]
    fn default_terminal_scenario() {
        let layout = compute_for_size(
            TermSize { cols: 80, rows: 24 },
            &input(default_order(), false, 140),
        )
        .expect("layout");
        assert_eq!(layout.entry.height, 2);
        assert_eq!(layout.notices.height, 18);
        assert_eq!(layout.dividers.len(), 2);
        assert_eq!(layout.dividers[0].y, 0);
        assert_eq!(layout.entry.y, 1);
        assert_eq!(layout.dividers[1].y, 3);
        assert_eq!(layout.notices.y, 4);
        assert_eq!(layout.statusbar.y, 22);
        assert_eq!(layout.tabbar.y, 23);
    }

    #[test]
    fn regions_do_not_overlap() {
        let layout = compute_for_size(
            TermSize { cols: 100, rows: 40 },
            &input(default_order(), true, 0),
        )
        .expect("layout");
        let mut rects = vec![layout.entry, layout.notices, layout.statusbar, layout.tabbar];
        rects.extend(layout.dividers.iter().copied());
        rects.sort_by_key(|rect| rect.y);
        for pair in rects.windows(2) {
            assert!(pair[0].y + pair[0].height <= pair[1].y);
        }
        let last = rects.last().expect("rect");
        assert_eq!(last.y + last.height, 39);
        assert_eq!(layout.entry.height, UNLIMITED_ENTRY_ROWS as u16);
        assert_eq!(layout.entry.x, 2);
    }

    #[test]
    fn entry_height_is_capped_at_half() {
        assert_eq!(entry_height(140, 80, 24), 2);
        assert_eq!(entry_height(1000, 20, 10), 5);
        assert_eq!(entry_height(0, 80, 24), 3);
        assert_eq!(entry_height(140, 80, 1), 1);
    }

    #[test]
    fn normalize_keeps_last_duplicate_and_appends_missing() {
        let order = normalize_order(&names(&[
            "tabbar", "divider", "entry", "divider", "tabbar", "bogus",
        ]));
        assert_eq!(
            order,
            vec![
                Region::Divider,
                Region::Entry,
                Region::Divider,
                Region::Tabbar,
                Region::Notices,
                Region::Statusbar,
            ]
        );
    }

    #[test]
    fn custom_order_places_tabbar_first() {
        let order = normalize_order(&names(&["tabbar", "notices", "statusbar", "entry"]));
        let layout = compute_for_size(TermSize { cols: 80, rows: 24 }, &input(order, false, 140))
            .expect("layout");
        assert_eq!(layout.tabbar.y, 0);
        assert_eq!(layout.notices.y, 1);
        assert_eq!(layout.notices.height, 20);
        assert_eq!(layout.entry.y, 22);
    }

    #[test]
    fn too_small_is_an_error() {
        let result = compute_for_size(
            TermSize { cols: 80, rows: 5 },
            &input(default_order(), false, 140),
        );
        assert!(matches!(result, Err(LayoutError::TooSmall { .. })));
    }

    #[test]
    fn resize_during_layout_retries() {
        let sizes = [
            TermSize { cols: 80, rows: 24 },
            TermSize { cols: 100, rows: 30 },
            TermSize { cols: 100, rows: 30 },
            TermSize { cols: 100, rows: 30 },
        ];
        let mut calls = 0;
        let layout = compute(
            || {
                let size = sizes[calls.min(sizes.len() - 1)];
                calls += 1;
                Ok(size)
            },
            &input(default_order(), false, 140),
        )
        .expect("layout");
        assert_eq!(layout.size, TermSize { cols: 100, rows: 30 });
        assert_eq!(calls, 4);
    }

    #[test]
    fn endless_resizing_gives_race_error() {
        let mut rows = 20;
        let result = compute(
            || {
                rows += 1;
                Ok(TermSize { cols: 80, rows })
            },
            &input(default_order(), false, 140),
        );
        assert!(matches!(
            result,
            Err(LayoutError::Race { attempts: MAX_LAYOUT_ATTEMPTS })
        ));
    }
}
