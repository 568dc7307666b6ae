//! Row action menus. One table owns one `ActionMenu`, so at most one row
//! menu is ever open.

/// Row index from which menus open upward.
pub const OPEN_UPWARD_FROM_ROW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    View,
    Edit,
    Delete,
    Accept,
    Reject,
}

impl RowAction {
    pub const STANDARD: [RowAction; 3] = [RowAction::View, RowAction::Edit, RowAction::Delete];
    pub const REVIEW: [RowAction; 4] = [
        RowAction::View,
        RowAction::Accept,
        RowAction::Reject,
        RowAction::Delete,
    ];

    /// Actions that ask for confirmation first.
    pub fn is_destructive(self) -> bool {
        matches!(self, RowAction::Delete | RowAction::Accept | RowAction::Reject)
    }

    pub fn label(self) -> &'static str {
        match self {
            RowAction::View => "View",
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
            RowAction::Accept => "Accept",
            RowAction::Reject => "Reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuDirection {
    Up,
    Down,
}

pub fn direction_for_row(row_index: usize) -> MenuDirection {
    if row_index >= OPEN_UPWARD_FROM_ROW {
        MenuDirection::Up
    } else {
        MenuDirection::Down
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMenu<Id> {
    active: Option<Id>,
}

impl<Id> Default for ActionMenu<Id> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<Id: Clone + PartialEq> ActionMenu<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `row`, closing whichever row was open; toggling the open row closes it.
    pub fn toggle(&mut self, row: Id) {
        if self.active.as_ref() == Some(&row) {
            self.active = None;
        } else {
            self.active = Some(row);
        }
    }

    pub fn is_open(&self, row: &Id) -> bool {
        self.active.as_ref() == Some(row)
    }

    pub fn active(&self) -> Option<&Id> {
        self.active.as_ref()
    }

    pub fn close_all(&mut self) {
        self.active = None;
    }

    /// Fires `action` on the open row and closes the menu.
    pub fn select(&mut self, action: RowAction) -> Option<(Id, RowAction)> {
        self.active.take().map(|row| (row, action))
    }

    pub fn click_outside(&mut self, inside_menu: bool) {
        if !inside_menu {
            self.close_all();
        }
    }

    pub fn key_pressed(&mut self, key: Key) {
        if key == Key::Escape {
            self.close_all();
        }
    }
}
