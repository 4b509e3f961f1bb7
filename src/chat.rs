use tracing::{debug, warn};

use crate::app::{joined, App, PendingChat};
use crate::backend::{BackendError, ChatReply};
use crate::chat_log::MessageId;
use crate::message::Message;

pub const THINKING: &str = "Thinking...";

impl App {
    /// Send the chat box contents as a question.
    ///
    /// Ignored while a question is pending, while chat is disabled, or when
    /// the trimmed text is empty.
    pub fn send_message(&mut self) {
        if self.session.is_chatting || !self.chat_enabled {
            return;
        }
        let text = self.chat_input.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.log.append(Message::user(text.clone()));
        self.chat_input.clear();
        self.chat_cursor = 0;

        let placeholder = self.log.append(Message::assistant(THINKING).small());
        self.session.is_chatting = true;
        self.animation_frame = 0;

        let backend = self.backend.clone();
        let task = tokio::spawn(async move { backend.chat(&text).await });
        self.chat = Some(PendingChat {
            placeholder,
            epoch: self.epoch,
            task,
        });
    }

    pub(crate) async fn complete_chat(&mut self, pending: PendingChat) {
        let result = joined(pending.task.await);
        self.finish_chat(pending.placeholder, pending.epoch, result);
    }

    fn finish_chat(
        &mut self,
        placeholder: MessageId,
        epoch: u64,
        result: Result<ChatReply, BackendError>,
    ) {
        self.session.is_chatting = false;
        if epoch != self.epoch {
            debug!("session was reset while waiting for an answer; dropping it");
            return;
        }

        self.log.remove(placeholder);
        match result {
            Ok(reply) => {
                debug!(source = ?reply.source, "answer received");
                self.log
                    .append(Message::assistant(reply.answer).with_source(reply.source));
            }
            Err(err) => {
                warn!(error = %err, "chat request failed");
                self.notifier.notify(format!("Chat error: {}", err));
            }
        }
    }
}
