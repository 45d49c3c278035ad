//! UI rendering and layout utilities.
//!
//! Pure rendering logic separated from state: functions here take data
//! and produce ratatui widgets without side effects.
//!
//! Submodules:
//! - layout: region geometry from terminal size and configured order
//! - theme: colour scheme resolution
//! - widgets: separator, tab strip, status line, entry grid, notice lines

mod layout;
mod theme;
mod widgets;

pub use layout::{
    compute, default_order, normalize_order, LayoutError, LayoutInput, Region, ScreenLayout,
    TermSize,
};
pub use theme::Theme;
pub use widgets::{
    render_border, render_entry, render_lines, render_separator, render_status, render_tab_strip,
};
