use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: Kind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Error,
            message: message.into(),
        }
    }

    /// "Failed to {action}: {err}"
    #[must_use]
    pub fn failure(action: &str, err: &impl fmt::Display) -> Self {
        Self::error(format!("Failed to {action}: {err}"))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// Pending notifications, the most recent one is shown first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Notifications(Vec<Notification>);

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        self.0.push(notification);
    }

    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.0.last()
    }

    pub fn dismiss(&mut self) -> Option<Notification> {
        self.0.pop()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|n| n.message.as_str())
    }
}
