use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::app::{joined, App, DocumentSource, InputMode, PendingUpload};
use crate::backend::BackendError;
use crate::message::{AnswerSource, Message};

/// Only `.pdf` (any case) is accepted
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

impl App {
    pub fn open_file_picker(&mut self) {
        if self.picker_enabled {
            self.input_mode = InputMode::PickingFile;
            self.path_cursor = self.path_input.chars().count();
        }
    }

    pub fn close_file_picker(&mut self) {
        if self.input_mode == InputMode::PickingFile {
            self.input_mode = InputMode::Normal;
        }
    }

    /// Enter in the picker popup
    pub fn submit_file_picker(&mut self) {
        self.close_file_picker();
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            return;
        }
        self.select_file(PathBuf::from(path));
    }

    pub fn select_file(&mut self, path: PathBuf) {
        if !self.picker_enabled {
            debug!(path = %path.display(), "file picker is locked; ignoring selection");
            return;
        }

        if !is_pdf(&path) {
            self.notifier.notify("Only PDF files are supported.");
            self.path_input.clear();
            self.path_cursor = 0;
            return;
        }

        self.begin_upload(path);
    }

    fn begin_upload(&mut self, path: PathBuf) {
        if self.session.is_uploading {
            debug!(path = %path.display(), "previous upload still running; ignoring selection");
            self.notifier.notify("An upload is still in progress.");
            return;
        }
        self.session.is_uploading = true;
        self.picker_enabled = false;

        self.active_source = "Processing document...".to_string();
        self.log.append(
            Message::assistant("Processing document. This may take a few seconds...").small(),
        );
        self.set_chat_enabled(false);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!(file = %path.display(), "uploading document");

        let backend = self.backend.clone();
        let task = tokio::spawn(async move { backend.upload(&path).await });
        self.upload = Some(PendingUpload {
            file_name,
            epoch: self.epoch,
            task,
        });
    }

    pub(crate) async fn complete_upload(&mut self, pending: PendingUpload) {
        let result = joined(pending.task.await);
        self.finish_upload(pending.file_name, pending.epoch, result);
    }

    fn finish_upload(
        &mut self,
        file_name: String,
        epoch: u64,
        result: Result<Option<String>, BackendError>,
    ) {
        self.session.is_uploading = false;
        if epoch != self.epoch {
            debug!(file = %file_name, "session was reset during upload; dropping result");
            return;
        }

        match result {
            Ok(message) => {
                if let Some(message) = message {
                    info!(file = %file_name, %message, "upload accepted");
                }
                self.session.current_source = Some(DocumentSource::Pdf);
                self.file_label = file_name.clone();
                self.picker_enabled = false;

                self.log.append(
                    Message::assistant("File is uploaded. Feel free to ask me anything.")
                        .with_source(Some(AnswerSource::File)),
                );

                self.active_source = format!("Active source: PDF ({})", file_name);
                self.set_chat_enabled(true);
            }
            Err(err) => {
                warn!(file = %file_name, error = %err, "upload failed");
                self.notifier.notify(format!("Upload error: {}", err));
                self.active_source = "Upload failed. Try again.".to_string();
                self.set_chat_enabled(false);
                self.picker_enabled = true;
            }
        }
    }
}
