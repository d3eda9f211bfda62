use crate::editor::LineEditor;
use crate::llm::{normalize_ratio, GenerationError, TaskGenerator};
use crate::models::{Entry, EntryId, ReorderTarget};
use crate::todo_list::TodoList;

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate tasks";

/// A generation the controller has accepted and marked busy for.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub project: String,
    pub ratio: f64,
}

#[derive(Debug, Clone)]
struct EditSession {
    id: EntryId,
    draft: LineEditor,
}

/// Owns the list and the interaction state around it: drafts, the in-place
/// edit session and the busy flag of an outstanding generation.
#[derive(Debug, Default)]
pub struct Controller {
    list: TodoList,
    new_entry: LineEditor,
    edit: Option<EditSession>,
    busy: bool,
    last_error: Option<String>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &TodoList {
        &self.list
    }

    pub fn entries(&self) -> &[Entry] {
        self.list.entries()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn new_entry_draft(&self) -> &LineEditor {
        &self.new_entry
    }

    pub fn new_entry_draft_mut(&mut self) -> &mut LineEditor {
        &mut self.new_entry
    }

    pub fn add_entry(&mut self, text: &str) -> Option<EntryId> {
        let id = self.list.add(text)?;
        self.new_entry.clear();
        Some(id)
    }

    /// Adds the new-entry draft as an entry.
    pub fn submit_new_entry(&mut self) -> Option<EntryId> {
        let text = self.new_entry.as_str().to_string();
        self.add_entry(&text)
    }

    pub fn toggle_entry(&mut self, id: EntryId) -> bool {
        self.list.toggle(id)
    }

    pub fn update_entry(&mut self, id: EntryId, text: &str) -> bool {
        self.list.update(id, text)
    }

    pub fn delete_entry(&mut self, id: EntryId) -> bool {
        let removed = self.list.remove(id);
        if removed && self.editing() == Some(id) {
            self.edit = None;
        }
        removed
    }

    /// Empties the list. There is no undo.
    pub fn clear_all(&mut self) -> bool {
        self.edit = None;
        self.list.clear()
    }

    pub fn reorder(&mut self, id: EntryId, target: ReorderTarget) -> bool {
        self.list.reorder(id, target)
    }

    pub fn editing(&self) -> Option<EntryId> {
        self.edit.as_ref().map(|session| session.id)
    }

    pub fn begin_edit(&mut self, id: EntryId) -> bool {
        match self.list.get(id) {
            Some(entry) => {
                self.edit = Some(EditSession {
                    id,
                    draft: LineEditor::with_content(entry.text.clone()),
                });
                true
            }
            None => false,
        }
    }

    pub fn edit_draft(&self) -> Option<&LineEditor> {
        self.edit.as_ref().map(|session| &session.draft)
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut LineEditor> {
        self.edit.as_mut().map(|session| &mut session.draft)
    }

    /// Saves the edit draft and ends the session. A blank draft is dropped.
    pub fn commit_edit(&mut self) -> bool {
        match self.edit.take() {
            Some(session) => self.update_entry(session.id, session.draft.as_str()),
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Marks a generation as outstanding. Returns `None` without side effects
    /// when the project is blank or another generation is still running.
    pub fn begin_generation(&mut self, project: &str, ratio: f64) -> Option<GenerationRequest> {
        if project.trim().is_empty() {
            log::debug!("begin_generation: empty project, skipping");
            return None;
        }
        if self.busy {
            log::debug!("begin_generation: generation already outstanding, skipping");
            return None;
        }
        self.busy = true;
        Some(GenerationRequest {
            project: project.to_string(),
            ratio: normalize_ratio(ratio),
        })
    }

    /// Settles the outstanding generation. Always clears the busy flag; on
    /// success appends every task in order, on failure leaves the list alone.
    pub fn finish_generation(
        &mut self,
        outcome: Result<Vec<String>, GenerationError>,
    ) -> Result<Vec<EntryId>, GenerationError> {
        if !self.busy {
            log::warn!("finish_generation: no generation outstanding, ignoring outcome");
            return Ok(Vec::new());
        }
        self.busy = false;

        match outcome {
            Ok(tasks) => {
                let ids = self.list.append_all(&tasks);
                log::info!("Generated {} tasks", ids.len());
                self.last_error = None;
                Ok(ids)
            }
            Err(err) => {
                log::warn!("Generation failed: {err}");
                self.last_error = Some(GENERATION_FAILED_MESSAGE.to_string());
                Err(err)
            }
        }
    }

    /// Runs one generation to completion against `generator`.
    pub async fn request_generation(
        &mut self,
        generator: &dyn TaskGenerator,
        project: &str,
        ratio: f64,
    ) -> Result<Vec<EntryId>, GenerationError> {
        let Some(request) = self.begin_generation(project, ratio) else {
            return Ok(Vec::new());
        };
        let outcome = generator.generate(&request.project, request.ratio).await;
        self.finish_generation(outcome)
    }
}
