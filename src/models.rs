use std::fmt;

/// Stable identifier of a to-do entry. Minted by `TodoList`, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub text: String,
    pub completed: bool,
}

/// Where a reordered entry should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderTarget {
    /// Directly in front of another entry
    Before(EntryId),
    /// Directly behind another entry
    After(EntryId),
    /// At this index of the resulting list
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Project,
    NewEntry,
    EditEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupMode {
    None,
    ConfirmClear,
    Help,
}
