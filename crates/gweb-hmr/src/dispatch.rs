//! Message kind to action dispatch table.

use std::collections::HashMap;

use crate::Message;

/// What a listener does in response to a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Full reload through [`ReloadSink::reload`](crate::ReloadSink::reload).
    Reload,
    /// Partial update through [`ReloadSink::patch`](crate::ReloadSink::patch).
    Patch,
    /// Do nothing.
    Ignore,
}

/// Maps each message kind to an [`Action`].
///
/// The default table reloads on [`Message::Reload`] and ignores everything
/// else. Kinds without an entry are ignored.
#[derive(Clone, Debug)]
pub struct DispatchTable {
    actions: HashMap<Message, Action>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::empty()
            .with(Message::Reload, Action::Reload)
            .with(Message::Noop, Action::Ignore)
            .with(Message::Error, Action::Ignore)
    }
}

impl DispatchTable {
    /// A table that ignores every kind.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Builder form of [`DispatchTable::set`].
    #[must_use]
    pub fn with(mut self, kind: Message, action: Action) -> Self {
        self.set(kind, action);
        self
    }

    /// Set the action for `kind`, returning the previous one.
    pub fn set(&mut self, kind: Message, action: Action) -> Option<Action> {
        self.actions.insert(kind, action)
    }

    #[must_use]
    pub fn action_for(&self, kind: Message) -> Action {
        self.actions.get(&kind).copied().unwrap_or(Action::Ignore)
    }
}
