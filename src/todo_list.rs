use crate::models::{Entry, EntryId, ReorderTarget};

/// Ordered, id-unique collection of to-do entries.
///
/// Every mutation returns `true` when the list changed. Unknown ids and blank
/// text are silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Default for TodoList {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoList {
    pub fn new() -> Self {
        TodoList {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn mint_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends one entry. Returns the new id, or `None` if `text` is blank.
    pub fn add(&mut self, text: &str) -> Option<EntryId> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.mint_id();
        self.entries.push(Entry {
            id,
            text: text.to_string(),
            completed: false,
        });
        log::debug!("todo_list: added {} ({} entries)", id, self.entries.len());
        Some(id)
    }

    /// Appends every non-blank text in order and returns the ids that were minted.
    pub fn append_all<I, S>(&mut self, texts: I) -> Vec<EntryId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .filter_map(|text| self.add(text.as_ref()))
            .collect()
    }

    pub fn toggle(&mut self, id: EntryId) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.completed = !entry.completed;
                log::debug!("todo_list: toggled {} (completed={})", id, entry.completed);
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, id: EntryId, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.text = text.to_string();
                log::debug!("todo_list: updated {}", id);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: EntryId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                log::debug!("todo_list: removed {} ({} entries)", id, self.entries.len());
                true
            }
            None => false,
        }
    }

    /// Drops every entry. The id counter keeps running so old ids stay dead.
    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        log::debug!("todo_list: cleared {} entries", self.entries.len());
        self.entries.clear();
        true
    }

    /// Moves `id` to the slot implied by `target`. Entries between the old and
    /// new slot shift by one; everything else keeps its place.
    pub fn reorder(&mut self, id: EntryId, target: ReorderTarget) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };

        let to = match target {
            ReorderTarget::Index(index) if index < self.entries.len() => index,
            ReorderTarget::Index(_) => return false,
            ReorderTarget::Before(other) | ReorderTarget::After(other) if other == id => return false,
            ReorderTarget::Before(other) => match self.position(other) {
                Some(anchor) if anchor > from => anchor - 1,
                Some(anchor) => anchor,
                None => return false,
            },
            ReorderTarget::After(other) => match self.position(other) {
                Some(anchor) if anchor > from => anchor,
                Some(anchor) => anchor + 1,
                None => return false,
            },
        };

        if to == from {
            return false;
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        log::debug!("todo_list: moved {} from {} to {}", id, from, to);
        true
    }
}
