use std::time::Instant;

use ratatui::layout::Rect;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use crate::backend::{BackendClient, BackendError, ChatReply};
use crate::chat_log::{ChatLog, MessageId};
use crate::config::Settings;
use crate::message::Message;
use crate::notify::Notifier;

pub const GREETING: &str = "Hi 👋 Upload a PDF to get started.";
pub const IDLE_STATUS: &str = "Upload a PDF to start";
pub const DEFAULT_FILE_LABEL: &str = "Choose PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    PickingFile,
}

/// What the backend is currently answering from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    Pdf,
}

/// Request guards. Each flag stays set until its request settles.
#[derive(Debug, Default)]
pub struct Session {
    pub current_source: Option<DocumentSource>,
    pub is_uploading: bool,
    pub is_chatting: bool,
}

pub(crate) type Task<T> = JoinHandle<Result<T, BackendError>>;

pub(crate) struct PendingUpload {
    pub file_name: String,
    pub epoch: u64,
    pub task: Task<Option<String>>,
}

pub(crate) struct PendingChat {
    pub placeholder: MessageId,
    pub epoch: u64,
    pub task: Task<ChatReply>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // Conversation
    pub log: ChatLog,
    pub notifier: Notifier,

    // Chat box
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input (chars)
    pub chat_enabled: bool,

    // File picker
    pub picker_enabled: bool,
    pub file_label: String,
    pub path_input: String,
    pub path_cursor: usize,

    // Status line under the title
    pub active_source: String,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Chat panel geometry (updated during render)
    pub chat_area: Option<Rect>,

    pub backend: BackendClient,

    // Bumped by every reset; results from older requests are dropped
    pub(crate) epoch: u64,
    pub(crate) upload: Option<PendingUpload>,
    pub(crate) chat: Option<PendingChat>,
    reset_tasks: Vec<Task<()>>,
    health_task: Option<Task<String>>,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            session: Session::default(),

            log: ChatLog::new(),
            notifier: Notifier::new(settings.toast_timeout),

            chat_input: String::new(),
            chat_cursor: 0,
            chat_enabled: false,

            picker_enabled: true,
            file_label: DEFAULT_FILE_LABEL.to_string(),
            path_input: String::new(),
            path_cursor: 0,

            active_source: String::new(),

            animation_frame: 0,

            chat_area: None,

            backend: BackendClient::new(&settings.backend_url),

            epoch: 0,
            upload: None,
            chat: None,
            reset_tasks: Vec::new(),
            health_task: None,
        };
        app.initialize();
        app
    }

    /// Put the conversation view into its starting state
    pub fn initialize(&mut self) {
        self.active_source = IDLE_STATUS.to_string();
        self.log.clear();
        self.log.append(Message::assistant(GREETING).small());
        self.set_chat_enabled(false);
    }

    pub fn set_chat_enabled(&mut self, enable: bool) {
        self.chat_enabled = enable;
        if enable {
            self.input_mode = InputMode::Editing;
            self.chat_cursor = self.chat_input.chars().count();
        } else if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
        }
    }

    /// Clear local state immediately, then tell the backend in the background.
    pub fn reset(&mut self) {
        info!("resetting session");
        self.session.current_source = None;
        self.epoch += 1;

        self.file_label = DEFAULT_FILE_LABEL.to_string();
        self.path_input.clear();
        self.path_cursor = 0;
        self.picker_enabled = true;
        if self.input_mode == InputMode::PickingFile {
            self.input_mode = InputMode::Normal;
        }

        self.initialize();

        let backend = self.backend.clone();
        self.reset_tasks
            .push(tokio::spawn(async move { backend.reset().await }));
    }

    fn finish_reset(&mut self, result: Result<(), BackendError>) {
        match result {
            Ok(()) => self.notifier.notify("Session reset"),
            Err(err) => {
                warn!(error = %err, "backend reset failed");
                self.notifier.notify("Reset failed");
            }
        }
    }

    /// Ping the backend once so a wrong URL shows up before the first upload
    pub fn check_backend(&mut self) {
        let backend = self.backend.clone();
        self.health_task = Some(tokio::spawn(async move { backend.health().await }));
    }

    fn finish_health(&mut self, result: Result<String, BackendError>) {
        match result {
            Ok(status) => info!(backend = self.backend.base_url(), %status, "backend is up"),
            Err(err) => {
                warn!(backend = self.backend.base_url(), error = %err, "backend health check failed");
                self.notifier.notify(format!("Backend unreachable: {}", err));
            }
        }
    }

    /// Called by Tick event
    pub fn tick(&mut self) {
        self.notifier.prune(Instant::now());
        if self.session.is_chatting {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Apply the results of any requests that have finished
    pub async fn poll_tasks(&mut self) {
        if self.upload.as_ref().is_some_and(|p| p.task.is_finished()) {
            if let Some(pending) = self.upload.take() {
                self.complete_upload(pending).await;
            }
        }

        if self.chat.as_ref().is_some_and(|p| p.task.is_finished()) {
            if let Some(pending) = self.chat.take() {
                self.complete_chat(pending).await;
            }
        }

        let mut i = 0;
        while i < self.reset_tasks.len() {
            if self.reset_tasks[i].is_finished() {
                let task = self.reset_tasks.remove(i);
                self.finish_reset(joined(task.await));
            } else {
                i += 1;
            }
        }

        if self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.health_task.take() {
                self.finish_health(joined(task.await));
            }
        }
    }

    /// Wait for every outstanding request and apply its result
    #[cfg(test)]
    pub async fn settle(&mut self) {
        if let Some(pending) = self.upload.take() {
            self.complete_upload(pending).await;
        }
        if let Some(pending) = self.chat.take() {
            self.complete_chat(pending).await;
        }
        for task in std::mem::take(&mut self.reset_tasks) {
            self.finish_reset(joined(task.await));
        }
        if let Some(task) = self.health_task.take() {
            self.finish_health(joined(task.await));
        }
    }
}

/// Fold a panicked or aborted task into the request error
pub(crate) fn joined<T>(
    result: Result<Result<T, BackendError>, JoinError>,
) -> Result<T, BackendError> {
    result.map_err(BackendError::from).and_then(|inner| inner)
}
