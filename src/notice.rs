use std::collections::VecDeque;

/// Maximum number of notices kept before the oldest is dropped.
const MAX_NOTICES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Dismissible notifications, oldest first.
#[derive(Debug, Default)]
pub struct Notices {
    items: VecDeque<Notice>,
    next_id: u64,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message.into())
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message.into())
    }

    fn push(&mut self, level: NoticeLevel, message: String) -> u64 {
        self.next_id += 1;
        if self.items.len() == MAX_NOTICES {
            self.items.pop_front();
        }
        self.items.push_back(Notice {
            id: self.next_id,
            level,
            message,
        });
        self.next_id
    }

    /// The notice that should be on screen: the oldest undismissed error,
    /// else the newest info.
    pub fn current(&self) -> Option<&Notice> {
        self.items
            .iter()
            .find(|n| n.level == NoticeLevel::Error)
            .or_else(|| self.items.back())
    }

    pub fn dismiss_current(&mut self) -> Option<Notice> {
        let id = self.current()?.id;
        self.dismiss(id)
    }

    pub fn dismiss(&mut self, id: u64) -> Option<Notice> {
        let idx = self.items.iter().position(|n| n.id == id)?;
        self.items.remove(idx)
    }

    pub fn has_error(&self) -> bool {
        self.items.iter().any(|n| n.level == NoticeLevel::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_take_precedence_over_info() {
        let mut notices = Notices::new();
        notices.info("Saved a.js");
        let err = notices.error("Failed to save file.");
        notices.info("Saved b.js");
        assert_eq!(notices.current().map(|n| n.id), Some(err));
        notices.dismiss_current();
        assert_eq!(
            notices.current().map(|n| n.message.as_str()),
            Some("Saved b.js")
        );
        assert!(!notices.has_error());
    }

    #[test]
    fn history_is_bounded() {
        let mut notices = Notices::new();
        for i in 0..(MAX_NOTICES + 5) {
            notices.info(format!("n{i}"));
        }
        assert_eq!(notices.len(), MAX_NOTICES);
        assert_eq!(notices.iter().next().map(|n| n.message.as_str()), Some("n5"));
    }

    #[test]
    fn dismiss_unknown_is_none() {
        let mut notices = Notices::new();
        assert!(notices.dismiss(42).is_none());
        assert!(notices.dismiss_current().is_none());
        assert!(notices.is_empty());
    }
}
