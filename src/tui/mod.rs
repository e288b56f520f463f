mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::db::{Database, Stats};
use crate::error::Result;
use crate::models::{AnsweredQuestion, SessionSummary};

const RECENT_SESSIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Sessions,
    SessionDetail,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Sessions,
            View::Sessions => View::Dashboard,
            View::SessionDetail => View::Sessions,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Sessions,
            View::Sessions => View::Dashboard,
            View::SessionDetail => View::Sessions,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App {
    db: Database,
    pub view: View,
    pub sessions: StatefulList<SessionSummary>,
    pub selected_session: Option<SessionSummary>,
    pub selected_answers: Vec<AnsweredQuestion>,
    pub stats: Stats,
    pub recent_sessions: Vec<SessionSummary>,
    pub filter_category: Option<String>,
    pub filter_input: String,
    pub filter_mode: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database) -> Result<Self> {
        let stats = db.get_stats()?;
        let sessions = db.list_session_summaries(None)?;
        let recent_sessions = sessions.iter().take(RECENT_SESSIONS).cloned().collect();

        Ok(Self {
            db,
            view: View::Dashboard,
            sessions: StatefulList::with_items(sessions),
            selected_session: None,
            selected_answers: Vec::new(),
            stats,
            recent_sessions,
            filter_category: None,
            filter_input: String::new(),
            filter_mode: false,
            should_quit: false,
        })
    }

    pub fn refresh_data(&mut self) -> Result<()> {
        self.stats = self.db.get_stats()?;
        let all = self.db.list_session_summaries(None)?;
        self.recent_sessions = all.iter().take(RECENT_SESSIONS).cloned().collect();
        self.sessions = StatefulList::with_items(filter_sessions(all, self.filter_category.as_deref()));

        if let Some(session) = &self.selected_session {
            self.selected_answers = self.db.session_answers(&session.session_id)?;
        }
        Ok(())
    }

    fn apply_filter(&mut self) -> Result<()> {
        if self.filter_input.is_empty() {
            self.filter_category = None;
        } else {
            self.filter_category = Some(self.filter_input.clone());
        }
        let all = self.db.list_session_summaries(None)?;
        self.sessions = StatefulList::with_items(filter_sessions(all, self.filter_category.as_deref()));
        Ok(())
    }

    fn select_session(&mut self) -> Result<()> {
        if let Some(summary) = self.sessions.selected_item() {
            self.selected_answers = self.db.session_answers(&summary.session_id)?;
            self.selected_session = Some(summary.clone());
            self.view = View::SessionDetail;
        }
        Ok(())
    }

    fn close_detail(&mut self) {
        self.view = View::Sessions;
        self.selected_session = None;
        self.selected_answers.clear();
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        if self.filter_mode {
            match key {
                KeyCode::Esc => {
                    self.filter_mode = false;
                    self.filter_input.clear();
                }
                KeyCode::Enter => {
                    self.filter_mode = false;
                    self.apply_filter()?;
                }
                KeyCode::Backspace => {
                    self.filter_input.pop();
                }
                KeyCode::Char(c) => {
                    self.filter_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data()?;
            }

            KeyCode::Char('/') if self.view == View::Sessions => {
                self.filter_mode = true;
                self.filter_input.clear();
            }

            KeyCode::Esc => match self.view {
                View::SessionDetail => self.close_detail(),
                View::Sessions if self.filter_category.is_some() => {
                    self.filter_input.clear();
                    self.apply_filter()?;
                }
                View::Sessions | View::Dashboard => {}
            },

            KeyCode::Char('h') | KeyCode::Left => match self.view {
                View::SessionDetail => self.close_detail(),
                _ => self.view = self.view.prev(),
            },
            KeyCode::Char('l') | KeyCode::Right => match self.view {
                View::Sessions => self.select_session()?,
                _ => self.view = self.view.next(),
            },

            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }
            KeyCode::BackTab => {
                self.view = self.view.prev();
            }

            KeyCode::Char('j') | KeyCode::Down if self.view == View::Sessions => {
                self.sessions.next()
            }
            KeyCode::Char('k') | KeyCode::Up if self.view == View::Sessions => {
                self.sessions.previous()
            }
            KeyCode::Char('g') if self.view == View::Sessions => self.sessions.first(),
            KeyCode::Char('G') if self.view == View::Sessions => self.sessions.last(),

            KeyCode::Enter if self.view == View::Sessions => self.select_session()?,

            _ => {}
        }
        Ok(())
    }
}

fn filter_sessions(sessions: Vec<SessionSummary>, category: Option<&str>) -> Vec<SessionSummary> {
    match category {
        Some(category) => {
            let needle = category.to_lowercase();
            sessions
                .into_iter()
                .filter(|s| s.category.to_lowercase().contains(&needle))
                .collect()
        }
        None => sessions,
    }
}

pub fn run(db: Database) -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Build state before touching the terminal so load errors print normally
    let mut app = App::new(db)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
