//! The callback registry (§6.1): a mapping from `(event, phase)` to a
//! host-supplied closure, replacing the implicit globals the original
//! system used to reach its scripting layer, menu renderer and display
//! list builder.

use std::collections::HashMap;

/// Event identifiers the core invokes against the host. Matches the
/// table in §6.1 exactly; names are kept close to the source so this
/// table can be cross-checked against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditEvent {
    /// Recompute the edit-axis display position.
    EaxesPos,
    /// Install a new menu item table.
    MenuSet,
    /// Flush the log buffer to the user.
    PrintResults,
    /// Invalidate the display of the solid being edited.
    ReplotEditingSolid,
    /// Mark the view as dirty.
    ViewSetFlag,
    /// Ask the host for a user-chosen file path.
    GetFilename,
    /// Ask the host which vertex of a face is the rotation's fixed
    /// vertex.
    ArbSetupRotface,
    /// Ask the host to draw an NMG diagnostic overlay.
    NmgEdebug,
    /// Tell the host a new sketch reference has been bound.
    ExtrSktName,
}

/// When, relative to the core's own state change, a callback fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    During,
    After,
}

/// Payload passed to a callback. Intentionally a thin, enum-tagged
/// bag rather than one struct per event: the host side matches on
/// `event` to know which variant to expect, the same contract the
/// table in §6.1 describes informally.
#[derive(Debug, Clone)]
pub enum CallbackArg {
    None,
    Point(glam::DVec3),
    Text(String),
    Index(usize),
    Log(String),
}

/// What the host returns from a callback it was asked to answer
/// (`ArbSetupRotface`, `GetFilename`). Most callbacks are pure
/// notifications and return `CallbackReply::Ack`.
#[derive(Debug, Clone)]
pub enum CallbackReply {
    Ack,
    Index(usize),
    Path(String),
}

type CallbackFn = Box<dyn Fn(CallbackArg) -> CallbackReply + Send + Sync>;

/// Host-owned mapping from `(event, phase)` to a handler. The core
/// never keeps callbacks alive past the session that registered them
/// (§5, resource discipline): this registry is a plain field on
/// [`crate::session::EditSession`], dropped along with it.
#[derive(Default)]
pub struct CallbackRegistry {
    handlers: HashMap<(EditEvent, Phase), CallbackFn>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, event: EditEvent, phase: Phase, handler: F)
    where
        F: Fn(CallbackArg) -> CallbackReply + Send + Sync + 'static,
    {
        self.handlers.insert((event, phase), Box::new(handler));
    }

    /// Invoke the handler for `(event, phase)` if one is registered;
    /// otherwise returns `CallbackReply::Ack` as a no-op default so
    /// that a host which only cares about a subset of events doesn't
    /// need to register every one.
    pub fn invoke(&self, event: EditEvent, phase: Phase, arg: CallbackArg) -> CallbackReply {
        match self.handlers.get(&(event, phase)) {
            Some(f) => f(arg),
            None => CallbackReply::Ack,
        }
    }

    pub fn is_registered(&self, event: EditEvent, phase: Phase) -> bool {
        self.handlers.contains_key(&(event, phase))
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("registered", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_event_acks() {
        let reg = CallbackRegistry::new();
        let reply = reg.invoke(EditEvent::ViewSetFlag, Phase::After, CallbackArg::None);
        assert!(matches!(reply, CallbackReply::Ack));
    }

    #[test]
    fn registered_handler_runs() {
        let mut reg = CallbackRegistry::new();
        reg.register(EditEvent::ArbSetupRotface, Phase::During, |_| {
            CallbackReply::Index(3)
        });
        let reply = reg.invoke(EditEvent::ArbSetupRotface, Phase::During, CallbackArg::None);
        assert!(matches!(reply, CallbackReply::Index(3)));
    }
}
