use std::path::PathBuf;

use oncosimis_core::{downloads, Action, BackendClient, Effect, FileRef, Session};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chat,
    Files,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub session: Session,

    // Message input
    pub input: String,
    pub input_cursor: usize,

    // Chat pane
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height, updated during render
    pub chat_width: u16,  // Inner width, for wrap estimates

    // Files pane
    pub files_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub files_area: Option<Rect>,

    client: BackendClient,
    download_dir: PathBuf,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        client: BackendClient,
        download_dir: PathBuf,
        welcome: Option<&str>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Chat,
            session: Session::new(welcome),

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            files_state: ListState::default(),

            animation_frame: 0,

            chat_area: None,
            files_area: None,

            client,
            download_dir,
            events,
        }
    }

    /// Feed an action to the session and start whatever work it asks for.
    /// Returns true when background work was started.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let clearing = matches!(action, Action::Clear);
        let before = (self.session.transcript().len(), self.session.awaiting_reply());
        let effect = self.session.apply(action);
        let after = (self.session.transcript().len(), self.session.awaiting_reply());

        if clearing {
            self.chat_scroll = 0;
            self.files_state.select(None);
            self.focus = FocusPane::Chat;
        } else if before != after {
            // Follow new output; status polls leave the reading position alone.
            self.scroll_to_bottom();
        }

        match effect {
            Some(effect) => {
                self.run_effect(effect);
                true
            }
            None => false,
        }
    }

    fn run_effect(&self, effect: Effect) {
        let client = self.client.clone();
        let events = self.events.clone();

        match effect {
            Effect::SendChat(text) => {
                tokio::spawn(async move {
                    let result = client.chat(&text).await;
                    let _ = events.send(AppEvent::Session(Action::ChatSettled(result)));
                });
            }
            Effect::Download(filename) => {
                let dir = self.download_dir.clone();
                tokio::spawn(async move {
                    let result = downloads::fetch_and_save(&client, &filename, &dir).await;
                    let _ = events.send(AppEvent::Session(Action::DownloadSettled { filename, result }));
                });
            }
        }
    }

    /// Send the input box contents. The text stays put if the session refused
    /// it (offline), so it can be sent again later.
    pub fn submit_input(&mut self) {
        if self.input.trim().is_empty() || !self.session.can_send() {
            return;
        }
        if self.dispatch(Action::Submit(self.input.clone())) {
            self.input.clear();
            self.input_cursor = 0;
        }
    }

    // Files pane
    pub fn file_refs(&self) -> Vec<&FileRef> {
        self.session.transcript().file_refs().collect()
    }

    pub fn has_files(&self) -> bool {
        self.session.transcript().file_refs().next().is_some()
    }

    pub fn files_nav_down(&mut self) {
        let len = self.file_refs().len();
        if len > 0 {
            let i = self.files_state.selected().map_or(0, |i| (i + 1).min(len - 1));
            self.files_state.select(Some(i));
        }
    }

    pub fn files_nav_up(&mut self) {
        let i = self.files_state.selected().unwrap_or(0);
        self.files_state.select(Some(i.saturating_sub(1)));
    }

    pub fn download_selected(&mut self) {
        let filename = self
            .files_state
            .selected()
            .and_then(|i| self.file_refs().get(i).map(|f| f.filename.clone()));
        if let Some(filename) = filename {
            self.dispatch(Action::Download(filename));
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Chat if self.has_files() => {
                if self.files_state.selected().is_none() {
                    self.files_state.select(Some(0));
                }
                FocusPane::Files
            }
            _ => FocusPane::Chat,
        };
    }

    // Chat scrolling
    pub fn scroll_down(&mut self) {
        if self.chat_scroll < self.max_scroll() {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.visible_height() / 2;
        self.chat_scroll = (self.chat_scroll + half_page).min(self.max_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.visible_height() / 2;
        self.chat_scroll = self.chat_scroll.saturating_sub(half_page);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn max_scroll(&self) -> u16 {
        self.transcript_lines().saturating_sub(self.visible_height())
    }

    /// Estimate of wrapped lines in the chat pane; mirrors `ui::render_chat`.
    fn transcript_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in self.session.transcript().entries() {
            total_lines += 1; // Role line
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                total_lines += char_count / wrap_width + 1;
            }
            total_lines += msg.files.len();
            total_lines += 1; // Blank line after message
        }
        if self.session.awaiting_reply() {
            total_lines += 2;
        }

        total_lines.min(u16::MAX as usize) as u16
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.awaiting_reply() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
