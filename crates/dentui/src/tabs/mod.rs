//! Tab collection with most-recently-used ordering.
//!
//! Tabs sit in display order in `tabs`; `order` lists the same indices
//! from most to least recently used, so `order[0]` is always the current
//! tab. Exactly one tab is active at any time.


use tracing::debug;

use crate::timeline::{HelpView, LineBuffer, Timeline, ViewKind};

pub type TabId = u64;

static HELP_KIND: ViewKind = ViewKind::Help;

#[derive(Debug, Clone)]
pub enum TabView {
    Timeline(Timeline),
    Help(HelpView),
}

impl TabView {
    pub fn kind(&self) -> &ViewKind {
        match self {
            TabView::Timeline(timeline) => timeline.kind(),
            TabView::Help(_) => &HELP_KIND,
        }
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        match self {
            TabView::Timeline(timeline) => Some(timeline),
            TabView::Help(_) => None,
        }
    }

    pub fn timeline_mut(&mut self) -> Option<&mut Timeline> {
        match self {
            TabView::Timeline(timeline) => Some(timeline),
            TabView::Help(_) => None,
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        match self {
            TabView::Timeline(timeline) => timeline.buffer(),
            TabView::Help(help) => help.buffer(),
        }
    }

    pub fn buffer_mut(&mut self) -> &mut LineBuffer {
        match self {
            TabView::Timeline(timeline) => timeline.buffer_mut(),
            TabView::Help(help) => help.buffer_mut(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tab {
    id: TabId,
    view: TabView,
    active: bool,
}

impl Tab {
    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn view(&self) -> &TabView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TabView {
        &mut self.view
    }

    pub fn kind(&self) -> &ViewKind {
        self.view.kind()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Title with paused and unread markers.
    pub fn display_name(&self) -> String {
        let mut name = self.kind().title();
        if let Some(timeline) = self.view.timeline() {
            if timeline.is_paused() {
                name.push_str(" [P]");
            }
            if !self.active && timeline.unread() > 0 {
                name.push_str(&format!(" ({})", timeline.unread()));
            }
        }
        name
    }
}

#[derive(Debug)]
pub struct TabManager {
    tabs: Vec<Tab>,
    order: Vec<usize>,
    current: usize,
    next_id: TabId,
}

impl TabManager {
    /// Build from the initial views; the first one is current. An empty
    /// list gets a help tab so there is always something active.
    pub fn new(views: Vec<TabView>) -> Self {
        let mut manager = Self {
            tabs: Vec::new(),
            order: Vec::new(),
            current: 0,
            next_id: 1,
        };
        for view in views {
            manager.open(view);
        }
        if manager.tabs.is_empty() {
            manager.append(TabView::Help(HelpView::new()));
        }
        manager.switch_to(0);
        manager
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Tab {
        &self.tabs[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.tabs.iter_mut()
    }

    fn activate(&mut self, index: usize) {
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.active = i == index;
        }
        self.current = index;
        if let Some(timeline) = self.tabs[index].view.timeline_mut() {
            timeline.mark_read();
        }
    }

    fn promote(&mut self, index: usize) {
        self.order.retain(|&i| i != index);
        self.order.insert(0, index);
    }

    /// Add a tab at the end and make it current.
    pub fn append(&mut self, view: TabView) -> usize {
        let index = self.tabs.len();
        self.tabs.push(Tab {
            id: self.next_id,
            view,
            active: false,
        });
        self.next_id += 1;
        self.order.insert(0, index);
        self.activate(index);
        debug!(index, name = %self.tabs[index].kind().title(), "tab opened");
        index
    }

    /// Append unless the view is a singleton kind that is already open.
    pub fn open(&mut self, view: TabView) -> Option<usize> {
        let kind = view.kind();
        if kind.is_singleton() && self.tabs.iter().any(|tab| tab.kind().same_kind(kind)) {
            return None;
        }
        Some(self.append(view))
    }

    /// Close the current tab. The only tab cannot be closed.
    pub fn close_current(&mut self) -> Option<Tab> {
        if self.tabs.len() <= 1 {
            return None;
        }
        let removed = self.current;
        let tab = self.tabs.remove(removed);
        self.order.retain(|&i| i != removed);
        for index in self.order.iter_mut() {
            if *index > removed {
                *index -= 1;
            }
        }
        let head = self.order[0];
        self.activate(head);
        debug!(removed, current = head, "tab closed");
        Some(tab)
    }

    pub fn switch_to(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.promote(index);
        self.activate(index);
        true
    }

    pub fn next(&mut self) -> bool {
        if self.current + 1 >= self.tabs.len() {
            return false;
        }
        self.switch_to(self.current + 1)
    }

    pub fn prev(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.switch_to(self.current - 1)
    }

    pub fn next_cycle(&mut self) -> bool {
        self.switch_to((self.current + 1) % self.tabs.len())
    }

    pub fn prev_cycle(&mut self) -> bool {
        let len = self.tabs.len();
        self.switch_to((self.current + len - 1) % len)
    }

    /// Digit hotkeys 1-9 select tabs by position.
    pub fn hotkey(&mut self, digit: u32) -> bool {
        if !(1..=9).contains(&digit) {
            return false;
        }
        self.switch_to(digit as usize - 1)
    }

    fn swap_with(&mut self, other: usize) {
        let current = self.current;
        self.tabs.swap(current, other);
        for index in self.order.iter_mut() {
            if *index == current {
                *index = other;
            } else if *index == other {
                *index = current;
            }
        }
        self.current = other;
    }

    pub fn swap_left(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.swap_with(self.current - 1);
        true
    }

    pub fn swap_right(&mut self) -> bool {
        if self.current + 1 >= self.tabs.len() {
            return false;
        }
        self.swap_with(self.current + 1);
        true
    }

    pub fn names(&self, enumerate: bool) -> Vec<String> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                if enumerate {
                    format!("{}: {}", i + 1, tab.display_name())
                } else {
                    tab.display_name()
                }
            })
            .collect()
    }
}
