use crate::message::Message;

/// Stable handle to a message in the log, used to drop placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId(u64);

/// Ordered, append-only view of the conversation.
///
/// Appending re-attaches the view to the bottom; manual scrolling detaches it
/// until the next append or an explicit `scroll_to_bottom`.
#[derive(Debug, Default)]
pub struct ChatLog {
    entries: Vec<(MessageId, Message)>,
    next_id: u64,
    scroll: u16,
    follow_tail: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            follow_tail: true,
            ..Self::default()
        }
    }

    pub fn append(&mut self, message: Message) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, message));
        self.scroll_to_bottom();
        id
    }

    /// Remove a message by id. Returns false if it was already gone.
    pub fn remove(&mut self, id: MessageId) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll = 0;
        self.follow_tail = true;
    }

    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.entries.iter().map(|(_, msg)| msg)
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.entries.last().map(|(_, msg)| msg)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_tail = false;
        self.scroll = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    /// Resolve the scroll offset for a viewport of `height` rows showing
    /// `total_lines` rows of content. Called from render.
    pub fn viewport_offset(&mut self, total_lines: u16, height: u16) -> u16 {
        let max_scroll = total_lines.saturating_sub(height);
        if self.follow_tail || self.scroll >= max_scroll {
            self.follow_tail = true;
            self.scroll = max_scroll;
        }
        self.scroll
    }
}
