use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::config::{Config, parse_key};
use crate::system::history::RollingHistory;
use crate::system::record::{ProcessRecord, Snapshot};
use crate::system::scheduler::SampleOutcome;
use crate::system::terminate::{TerminateOutcome, terminate_process};
use crate::table::{self, ColumnSet, SortColumn};
use crate::ui::theme::Theme;

const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    created: Instant,
}

impl Notice {
    fn new(text: String, kind: NoticeKind) -> Self {
        Notice {
            text,
            kind,
            created: Instant::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub search: KeyCode,
    pub terminate: KeyCode,
    pub sort_pid: KeyCode,
    pub sort_name: KeyCode,
    pub sort_cpu: KeyCode,
    pub sort_memory: KeyCode,
    pub cycle_sort: KeyCode,
    pub toggle_columns: KeyCode,
    pub cycle_theme: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            search: parse_key(&kb.search).unwrap_or(KeyCode::Char('/')),
            terminate: parse_key(&kb.terminate).unwrap_or(KeyCode::Char('k')),
            sort_pid: parse_key(&kb.sort_pid).unwrap_or(KeyCode::Char('p')),
            sort_name: parse_key(&kb.sort_name).unwrap_or(KeyCode::Char('n')),
            sort_cpu: parse_key(&kb.sort_cpu).unwrap_or(KeyCode::Char('c')),
            sort_memory: parse_key(&kb.sort_memory).unwrap_or(KeyCode::Char('m')),
            cycle_sort: parse_key(&kb.cycle_sort).unwrap_or(KeyCode::Char('s')),
            toggle_columns: parse_key(&kb.toggle_columns).unwrap_or(KeyCode::Char('x')),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.search), "Search processes"),
            (key_label(self.terminate), "Terminate (SIGTERM)"),
            (key_label(self.sort_pid), "Sort by PID"),
            (key_label(self.sort_name), "Sort by name"),
            (key_label(self.sort_cpu), "Sort by CPU"),
            (key_label(self.sort_memory), "Sort by memory"),
            (key_label(self.cycle_sort), "Cycle sort column"),
            (key_label(self.toggle_columns), "Toggle extended columns"),
            (key_label(self.cycle_theme), "Cycle theme"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("↑↓ PgUp PgDn".to_string(), "Navigate"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    /// Last successfully published snapshot; replaced wholesale, never edited.
    pub snapshot: Arc<Snapshot>,
    /// Display order as indices into `snapshot.processes`.
    pub order: Vec<usize>,
    /// Position in `order` of the highlighted row.
    pub selected: usize,
    pub sort: Option<SortColumn>,
    pub columns: ColumnSet,
    pub input_mode: InputMode,
    pub search_text: String,
    pub notice: Option<Notice>,
    pub cpu_history: RollingHistory<f32>,
    pub memory_history: RollingHistory<f32>,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    /// Rows visible in the table, set by the renderer.
    pub viewport_rows: usize,
    terminator: fn(u32) -> TerminateOutcome,
}

impl App {
    pub fn new(config: &Config, initial: Snapshot) -> Self {
        let columns = if config.general.extended_columns {
            ColumnSet::Extended
        } else {
            ColumnSet::Basic
        };
        let mut app = App {
            running: true,
            snapshot: Arc::new(Snapshot::empty()),
            order: Vec::new(),
            selected: 0,
            sort: SortColumn::from_str_config(&config.general.default_sort),
            columns,
            input_mode: InputMode::Normal,
            search_text: String::new(),
            notice: None,
            cpu_history: RollingHistory::new(config.history.capacity),
            memory_history: RollingHistory::new(config.history.capacity),
            theme: Theme::from_config(&config.colors.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            viewport_rows: 20,
            terminator: terminate_process,
        };
        app.publish(Arc::new(initial));
        app
    }

    pub fn apply_sample(&mut self, outcome: SampleOutcome) {
        match outcome {
            Ok(snapshot) => self.publish(snapshot),
            Err(err) => {
                self.set_notice(
                    format!("Sampling failed: {err} (showing last snapshot)"),
                    NoticeKind::Error,
                );
            }
        }
    }

    /// Swaps in a new snapshot, keeping the highlighted PID when it survived.
    pub fn publish(&mut self, snapshot: Arc<Snapshot>) {
        let selected_pid = self.selected_pid();

        self.cpu_history.push(snapshot.totals.cpu_percent);
        self.memory_history.push(snapshot.totals.memory_percent());
        self.snapshot = snapshot;
        self.reorder();

        let followed = selected_pid.and_then(|pid| self.position_of(pid));
        self.selected = match followed {
            Some(pos) => pos,
            None => self.selected.min(self.order.len().saturating_sub(1)),
        };

        self.expire_notice();
    }

    fn reorder(&mut self) {
        self.order = table::sort_order(&self.snapshot, self.sort);
    }

    fn position_of(&self, pid: u32) -> Option<usize> {
        self.order
            .iter()
            .position(|&index| self.snapshot.processes[index].pid == pid)
    }

    pub fn expire_notice(&mut self) {
        if let Some(notice) = &self.notice
            && notice.created.elapsed() >= NOTICE_TTL
        {
            self.notice = None;
        }
    }

    fn set_notice(&mut self, text: String, kind: NoticeKind) {
        self.notice = Some(Notice::new(text, kind));
    }

    pub fn rows(&self) -> impl Iterator<Item = &ProcessRecord> + '_ {
        self.order.iter().map(|&index| &self.snapshot.processes[index])
    }

    pub fn selected_record(&self) -> Option<&ProcessRecord> {
        self.order
            .get(self.selected)
            .map(|&index| &self.snapshot.processes[index])
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected_record().map(|p| p.pid)
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Search => self.map_key_search(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Navigation keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::PageUp => return Action::Navigate(Direction::PageUp),
            KeyCode::PageDown => return Action::Navigate(Direction::PageDown),
            KeyCode::Home => return Action::Navigate(Direction::Top),
            KeyCode::End => return Action::Navigate(Direction::Bottom),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.search {
            return Action::EnterSearchMode;
        }
        if code == kb.terminate {
            return match self.selected_pid() {
                Some(pid) => Action::Terminate(pid),
                None => Action::None,
            };
        }
        if code == kb.sort_pid {
            return Action::SortBy(SortColumn::Pid);
        }
        if code == kb.sort_name {
            return Action::SortBy(SortColumn::Name);
        }
        if code == kb.sort_cpu {
            return Action::SortBy(SortColumn::Cpu);
        }
        if code == kb.sort_memory {
            return Action::SortBy(SortColumn::Memory);
        }
        if code == kb.cycle_sort {
            return Action::CycleSort;
        }
        if code == kb.toggle_columns {
            return Action::ToggleColumns;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_search(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::CancelSearch,
            KeyCode::Enter => Action::SubmitSearch,
            KeyCode::Backspace => {
                let mut text = self.search_text.clone();
                text.pop();
                Action::UpdateSearch(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.search_text.clone();
                text.push(c);
                Action::UpdateSearch(text)
            }
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::EnterSearchMode => {
                self.search_text.clear();
                self.input_mode = InputMode::Search;
            }
            Action::UpdateSearch(text) => self.search_text = text,
            Action::CancelSearch => {
                self.search_text.clear();
                self.input_mode = InputMode::Normal;
            }
            Action::SubmitSearch => {
                self.input_mode = InputMode::Normal;
                self.search();
            }
            Action::Terminate(pid) => self.terminate(pid),
            Action::SortBy(column) => self.sort_by(Some(column)),
            Action::CycleSort => {
                let next = self.sort.map_or(SortColumn::Pid, SortColumn::next);
                self.sort_by(Some(next));
            }
            Action::ToggleColumns => self.columns = self.columns.toggle(),
            Action::CycleTheme => self.theme = self.theme.next(),
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::None => {}
        }
    }

    fn navigate(&mut self, direction: Direction) {
        if self.order.is_empty() {
            return;
        }
        let last = self.order.len() - 1;
        let page = self.viewport_rows.max(1);
        self.selected = match direction {
            Direction::Up => self.selected.saturating_sub(1),
            Direction::Down => (self.selected + 1).min(last),
            Direction::PageUp => self.selected.saturating_sub(page),
            Direction::PageDown => (self.selected + page).min(last),
            Direction::Top => 0,
            Direction::Bottom => last,
        };
    }

    fn sort_by(&mut self, column: Option<SortColumn>) {
        let selected_pid = self.selected_pid();
        self.sort = column;
        self.reorder();
        if let Some(pos) = selected_pid.and_then(|pid| self.position_of(pid)) {
            self.selected = pos;
        }
    }

    fn search(&mut self) {
        let query = self.search_text.clone();
        if query.trim().is_empty() {
            return;
        }
        match table::find_first(&self.snapshot, &self.order, &query, self.columns) {
            Some(pos) => {
                self.selected = pos;
                self.notice = None;
            }
            None => self.set_notice(
                format!("No process matching \"{query}\" found"),
                NoticeKind::Info,
            ),
        }
    }

    fn terminate(&mut self, pid: u32) {
        let outcome = (self.terminator)(pid);
        tracing::info!(pid, outcome = ?outcome, "terminate requested");
        let kind = if outcome.is_success() {
            NoticeKind::Success
        } else {
            NoticeKind::Error
        };
        self.set_notice(outcome.message(), kind);
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}
