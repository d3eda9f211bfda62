use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::controller::Controller;
use crate::editor::LineEditor;
use crate::llm::{GenerationError, TaskGenerator};
use crate::models::{EntryId, InputMode, PopupMode, ReorderTarget};

const TICK_RATE: Duration = Duration::from_millis(100);
const RATIO_STEP: i16 = 5;

type GenerationOutcome = Result<Vec<String>, GenerationError>;

pub struct App {
    controller: Controller,
    generator: Arc<dyn TaskGenerator>,
    runtime: Handle,
    pending: Option<oneshot::Receiver<GenerationOutcome>>,
    pub project: LineEditor,
    pub ratio_percent: u8,
    pub input_mode: InputMode,
    pub popup_mode: PopupMode,
    pub list_state: ListState,
    list_area: Rect,
    drag_source: Option<EntryId>,
    pub should_quit: bool,
}

impl App {
    pub fn new(runtime: Handle, generator: Arc<dyn TaskGenerator>, project: String, ratio: f64) -> Self {
        App {
            controller: Controller::new(),
            generator,
            runtime,
            pending: None,
            project: LineEditor::with_content(project),
            ratio_percent: crate::llm::prompt::balance_split(ratio).0,
            input_mode: InputMode::Normal,
            popup_mode: PopupMode::None,
            list_state: ListState::default(),
            list_area: Rect::default(),
            drag_source: None,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn ratio(&self) -> f64 {
        f64::from(self.ratio_percent) / 100.0
    }

    pub fn adjust_ratio(&mut self, delta: i16) {
        let value = (i16::from(self.ratio_percent) + delta).clamp(0, 100);
        self.ratio_percent = value as u8;
    }

    pub fn selected_id(&self) -> Option<EntryId> {
        self.list_state
            .selected()
            .and_then(|i| self.controller.entries().get(i))
            .map(|entry| entry.id)
    }

    fn select_id(&mut self, id: EntryId) {
        self.list_state.select(self.controller.list().position(id));
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.list().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn next_item(&mut self) {
        let len = self.controller.list().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let len = self.controller.list().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn move_selected(&mut self, up: bool) {
        let (Some(id), Some(index)) = (self.selected_id(), self.list_state.selected()) else {
            return;
        };
        let target = if up {
            match index.checked_sub(1) {
                Some(target) => target,
                None => return,
            }
        } else {
            index + 1
        };
        if self.controller.reorder(id, ReorderTarget::Index(target)) {
            self.select_id(id);
        }
    }

    /// Kicks off a generation on the runtime unless one is already running.
    pub fn start_generation(&mut self) {
        let Some(request) = self.controller.begin_generation(self.project.as_str(), self.ratio()) else {
            return;
        };
        log::info!(
            "Generating tasks for {:?} at {}% work",
            request.project,
            self.ratio_percent
        );
        let (tx, rx) = oneshot::channel();
        let generator = Arc::clone(&self.generator);
        self.runtime.spawn(async move {
            let outcome = generator.generate(&request.project, request.ratio).await;
            let _ = tx.send(outcome);
        });
        self.pending = Some(rx);
    }

    /// Settles a finished generation, if any. A task that died without
    /// reporting counts as a failure.
    pub fn poll_generation(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                log::error!("Error generating todos: generation task ended without a result");
                Err(GenerationError::Failed)
            }
        };
        self.pending = None;
        let _ = self.controller.finish_generation(outcome);
        self.clamp_selection();
    }

    fn active_editor(&mut self) -> Option<&mut LineEditor> {
        match self.input_mode {
            InputMode::Normal => None,
            InputMode::Project => Some(&mut self.project),
            InputMode::NewEntry => Some(self.controller.new_entry_draft_mut()),
            InputMode::EditEntry => self.controller.edit_draft_mut(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup_mode != PopupMode::None {
            self.handle_popup_key(key);
        } else if self.input_mode == InputMode::Normal {
            self.handle_normal_key(key);
        } else {
            self.handle_input_key(key);
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        if self.popup_mode == PopupMode::ConfirmClear && matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            if self.controller.clear_all() {
                log::info!("Cleared all todos");
            }
            self.list_state.select(None);
        }
        self.popup_mode = PopupMode::None;
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up if shift => self.move_selected(true),
            KeyCode::Down if shift => self.move_selected(false),
            KeyCode::Char('K') => self.move_selected(true),
            KeyCode::Char('J') => self.move_selected(false),
            KeyCode::Up | KeyCode::Char('k') => self.previous_item(),
            KeyCode::Down | KeyCode::Char('j') => self.next_item(),
            KeyCode::Left | KeyCode::Char('h') => self.adjust_ratio(-RATIO_STEP),
            KeyCode::Right | KeyCode::Char('l') => self.adjust_ratio(RATIO_STEP),
            KeyCode::Char('p') => self.input_mode = InputMode::Project,
            KeyCode::Char('a') => self.input_mode = InputMode::NewEntry,
            KeyCode::Char('g') => self.start_generation(),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    if self.controller.begin_edit(id) {
                        self.input_mode = InputMode::EditEntry;
                    }
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    self.controller.toggle_entry(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.controller.delete_entry(id);
                    self.clamp_selection();
                }
            }
            KeyCode::Char('C') => {
                if !self.controller.list().is_empty() {
                    self.popup_mode = PopupMode::ConfirmClear;
                }
            }
            KeyCode::Char('?') => self.popup_mode = PopupMode::Help,
            KeyCode::Esc => self.controller.dismiss_error(),
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.input_mode == InputMode::EditEntry {
                    self.controller.cancel_edit();
                }
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.submit_input(),
            code => {
                if let Some(editor) = self.active_editor() {
                    match code {
                        KeyCode::Char(c) => editor.insert_char(c),
                        KeyCode::Backspace => editor.delete_char(),
                        KeyCode::Delete => editor.delete_forward(),
                        KeyCode::Left => editor.move_cursor_left(),
                        KeyCode::Right => editor.move_cursor_right(),
                        KeyCode::Home => editor.move_to_start_of_line(),
                        KeyCode::End => editor.move_to_end_of_line(),
                        _ => {}
                    }
                    return;
                }
                // The edited entry is gone
                self.input_mode = InputMode::Normal;
            }
        }
    }

    fn submit_input(&mut self) {
        match self.input_mode {
            InputMode::Project => {
                self.input_mode = InputMode::Normal;
                self.start_generation();
            }
            // Stays in add mode so several entries can be typed in a row
            InputMode::NewEntry => {
                if let Some(id) = self.controller.submit_new_entry() {
                    self.select_id(id);
                }
            }
            InputMode::EditEntry => {
                self.controller.commit_edit();
                self.input_mode = InputMode::Normal;
            }
            InputMode::Normal => {}
        }
    }

    /// Row under the pointer, if it is an entry of the list.
    fn index_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area;
        let inside = column > area.x
            && column + 1 < area.x + area.width
            && row > area.y
            && row + 1 < area.y + area.height;
        if !inside {
            return None;
        }
        let index = self.list_state.offset() + usize::from(row - area.y - 1);
        (index < self.controller.entries().len()).then_some(index)
    }

    /// Press on a row picks an entry up, release on another row drops it there.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_source = self
                    .index_at(mouse.column, mouse.row)
                    .and_then(|i| self.controller.entries().get(i))
                    .map(|entry| entry.id);
                if let Some(id) = self.drag_source {
                    self.select_id(id);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(source) = self.drag_source.take() else {
                    return;
                };
                if let Some(target) = self.index_at(mouse.column, mouse.row) {
                    if self.controller.reorder(source, ReorderTarget::Index(target)) {
                        log::debug!("Dragged {} to position {}", source, target);
                    }
                }
                self.select_id(source);
            }
            _ => {}
        }
    }
}

pub fn run_tui(runtime: Handle, generator: Arc<dyn TaskGenerator>, project: String, ratio: f64) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(runtime, generator, project, ratio);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.poll_generation();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn input_line(editor: &LineEditor, active: bool) -> Line<'_> {
    if !active {
        return Line::from(editor.as_str());
    }
    let (before, at, after) = editor.split_at_cursor();
    let cursor = at.map(String::from).unwrap_or_else(|| " ".to_string());
    Line::from(vec![
        Span::raw(before),
        Span::styled(cursor, Style::default().bg(Color::Cyan).fg(Color::Black)),
        Span::raw(after),
    ])
}

fn input_block(title: &str, active: bool) -> Block<'_> {
    let border = if active { Color::Cyan } else { Color::Gray };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border))
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    let project_active = app.input_mode == InputMode::Project;
    let project = Paragraph::new(input_line(&app.project, project_active))
        .block(input_block("What project do you want to work on today? (p)", project_active));
    f.render_widget(project, chunks[0]);

    let work = app.ratio_percent;
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Life ← Balance (←/→) → Work"))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(app.ratio())
        .label(format!("Work-Life Balance: {}% Work / {}% Life", work, 100 - work));
    f.render_widget(gauge, chunks[1]);

    let adding = app.input_mode == InputMode::NewEntry;
    let new_entry = Paragraph::new(input_line(app.controller.new_entry_draft(), adding))
        .block(input_block("Add a new todo (a)", adding));
    f.render_widget(new_entry, chunks[2]);

    render_list(f, app, chunks[3]);
    render_status(f, app, chunks[4]);

    match app.popup_mode {
        PopupMode::ConfirmClear => {
            let area = centered_rect(50, 20, f.area());
            let content = Paragraph::new("Delete every todo? This cannot be undone.\n\ny: Yes, clear the list\nany other key: Cancel")
                .block(
                    Block::default()
                        .title("Clear All")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::DarkGray)),
                )
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White));
            f.render_widget(Clear, area);
            f.render_widget(content, area);
        }
        PopupMode::Help => {
            let area = centered_rect(60, 60, f.area());
            let content = Paragraph::new(
                "p: Edit project   g: Generate todos   ←/→: Balance\n\
                 a: Add todo   e/Enter: Edit   Space: Toggle done\n\
                 d/Del: Delete   C: Clear all\n\
                 ↑/↓: Select   K/J or Shift+↑/↓: Move\n\
                 Mouse: drag a todo onto another row to move it\n\
                 Esc: Dismiss error   q: Quit\n\n\
                 Press any key to close",
            )
            .block(
                Block::default()
                    .title("Controls")
                    .borders(Borders::ALL)
                    .style(Style::default().bg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::White));
            f.render_widget(Clear, area);
            f.render_widget(content, area);
        }
        PopupMode::None => {}
    }
}

fn render_list(f: &mut Frame, app: &mut App, area: Rect) {
    app.list_area = area;
    let entries = app.controller.entries();
    let title = format!("Your Todo List ({})", entries.len());
    let block = Block::default().borders(Borders::ALL).title(title);

    if entries.is_empty() {
        let empty = Paragraph::new("No todos yet. Generate some or add your own!")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    }

    let editing = app.controller.editing();
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let checkbox = if entry.completed { "[x] " } else { "[ ] " };
            let mut spans = vec![Span::styled(checkbox, Style::default().fg(Color::Cyan))];
            if editing == Some(entry.id) {
                if let Some(draft) = app.controller.edit_draft() {
                    spans.extend(input_line(draft, true).spans);
                }
            } else if entry.completed {
                spans.push(Span::styled(
                    entry.text.as_str(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
                ));
            } else {
                spans.push(Span::styled(entry.text.as_str(), Style::default().fg(Color::White)));
            }
            if app.drag_source == Some(entry.id) {
                spans.push(Span::styled("  ⇅", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let status = if app.controller.is_busy() {
        Line::from(Span::styled("Generating todos...", Style::default().fg(Color::Yellow)))
    } else if let Some(message) = app.controller.last_error() {
        Line::from(vec![
            Span::styled(message, Style::default().fg(Color::Red)),
            Span::raw("  (Esc to dismiss)"),
        ])
    } else {
        let hint = match app.input_mode {
            InputMode::Normal if app.project.is_blank() => "p: Describe a project to generate todos  a: Add  ?: Help  q: Quit",
            InputMode::Normal => "g: Generate  a: Add  e: Edit  Space: Done  d: Delete  ?: Help  q: Quit",
            InputMode::Project => "Enter: Generate  Esc: Done",
            InputMode::NewEntry => "Enter: Add  Esc: Done",
            InputMode::EditEntry => "Enter: Save  Esc: Cancel",
        };
        Line::from(Span::styled(hint, Style::default().fg(Color::Gray)))
    };
    f.render_widget(Paragraph::new(status), area);
}

// Helper function to create centered rectangles for popups
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::llm::TemplateGenerator;

    struct CountingGenerator {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TaskGenerator for CountingGenerator {
        async fn generate(&self, _project: &str, _ratio: f64) -> Result<Vec<String>, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["Write copy".to_string(), "Review copy".to_string()])
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl TaskGenerator for PanickingGenerator {
        async fn generate(&self, _project: &str, _ratio: f64) -> Result<Vec<String>, GenerationError> {
            panic!("transport exploded");
        }
    }

    fn app_with(generator: Arc<dyn TaskGenerator>, project: &str) -> App {
        App::new(Handle::current(), generator, project.to_string(), 0.5)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn texts(app: &App) -> Vec<String> {
        app.controller().entries().iter().map(|e| e.text.clone()).collect()
    }

    async fn settle(app: &mut App) {
        for _ in 0..100 {
            app.poll_generation();
            if !app.controller().is_busy() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("generation never settled");
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_add_entries_from_keyboard() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "");
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Walk dog");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert_eq!(texts(&app), vec!["Buy milk", "Walk dog"]);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[tokio::test]
    async fn test_edit_toggle_delete_from_keyboard() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "");
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "x");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "y");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::EditEntry);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "z");
        press(&mut app, KeyCode::Enter);
        assert_eq!(texts(&app), vec!["z", "y"]);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.controller().entries()[0].completed);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(texts(&app), vec!["y"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_generate_appends_and_settles() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Arc::new(CountingGenerator { calls: Arc::clone(&calls) });
        let mut app = app_with(generator, "launch site");

        press(&mut app, KeyCode::Char('g'));
        assert!(app.controller().is_busy());
        press(&mut app, KeyCode::Char('g'));

        settle(&mut app).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(texts(&app), vec!["Write copy", "Review copy"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_mutations_while_generating() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "garden");
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "mine");
        press(&mut app, KeyCode::Enter);
        assert_eq!(texts(&app), vec!["mine"]);

        settle(&mut app).await;
        assert_eq!(texts(&app)[0], "mine");
        assert_eq!(texts(&app).len(), 8);
    }

    #[tokio::test]
    async fn test_blank_project_does_not_generate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = app_with(Arc::new(CountingGenerator { calls: Arc::clone(&calls) }), "  ");
        press(&mut app, KeyCode::Char('g'));
        assert!(!app.controller().is_busy());
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_generation_releases_busy() {
        let mut app = app_with(Arc::new(PanickingGenerator), "site");
        press(&mut app, KeyCode::Char('g'));
        settle(&mut app).await;

        assert!(texts(&app).is_empty());
        assert!(app.controller().last_error().is_some());
        assert!(render(&mut app).contains("Failed to generate tasks"));

        press(&mut app, KeyCode::Esc);
        assert!(app.controller().last_error().is_none());
    }

    #[tokio::test]
    async fn test_ratio_keys_clamp() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "");
        for _ in 0..30 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.ratio_percent, 100);
        for _ in 0..30 {
            press(&mut app, KeyCode::Left);
        }
        assert_eq!(app.ratio_percent, 0);
        assert!(render(&mut app).contains("0% Work / 100% Life"));
    }

    #[tokio::test]
    async fn test_clear_needs_confirmation() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "");
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "a");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(texts(&app).len(), 1);

        press(&mut app, KeyCode::Char('C'));
        assert_eq!(app.popup_mode, PopupMode::ConfirmClear);
        press(&mut app, KeyCode::Char('y'));
        assert!(texts(&app).is_empty());
        assert_eq!(app.popup_mode, PopupMode::None);
    }

    #[tokio::test]
    async fn test_keyboard_move() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "");
        press(&mut app, KeyCode::Char('a'));
        for text in ["A", "B", "C"] {
            type_text(&mut app, text);
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('K'));
        assert_eq!(texts(&app), vec!["A", "C", "B"]);
        app.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT));
        assert_eq!(texts(&app), vec!["C", "A", "B"]);
        press(&mut app, KeyCode::Char('K'));
        assert_eq!(texts(&app), vec!["C", "A", "B"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_mouse_drag_reorders() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "");
        press(&mut app, KeyCode::Char('a'));
        for text in ["A", "B", "C"] {
            type_text(&mut app, text);
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Esc);
        render(&mut app);

        // Three 3-row inputs, then the list border; first entry sits on row 10
        let mouse = |kind, row| MouseEvent {
            kind,
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 12));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 10));

        assert_eq!(texts(&app), vec!["C", "A", "B"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_empty_list_message() {
        let mut app = app_with(Arc::new(TemplateGenerator::default()), "");
        let screen = render(&mut app);
        assert!(screen.contains("No todos yet. Generate some or add your own!"));
        assert!(screen.contains("50% Work / 50% Life"));
    }
}
