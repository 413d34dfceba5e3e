use tokio::sync::oneshot;

const LABEL_PREFIX: &str = "picker-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickerId(pub u64);

impl PickerId {
    pub fn label(self) -> String {
        format!("{}{}", LABEL_PREFIX, self.0)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        label.strip_prefix(LABEL_PREFIX)?.parse().ok().map(Self)
    }
}

/// One open picker window and the caller waiting on it.
#[derive(Debug)]
pub struct PickerSession {
    pub id: PickerId,
    reply: Option<oneshot::Sender<Option<String>>>,
    outcome: Option<Option<String>>,
}

impl PickerSession {
    pub fn new(id: PickerId) -> (Self, oneshot::Receiver<Option<String>>) {
        let (tx, rx) = oneshot::channel();
        let session = Self {
            id,
            reply: Some(tx),
            outcome: None,
        };
        (session, rx)
    }

    /// Settles the session. Only the first call has any effect.
    pub fn resolve(&mut self, source: Option<String>) -> bool {
        let Some(reply) = self.reply.take() else {
            return false;
        };
        if reply.send(source.clone()).is_err() {
            log::debug!("Picker {:?} caller went away before resolution", self.id);
        }
        self.outcome = Some(source);
        true
    }

    /// `None` until resolved, then the source that was picked (if any).
    pub fn outcome(&self) -> Option<&Option<String>> {
        self.outcome.as_ref()
    }
}

/// Holds at most one open picker session.
#[derive(Debug, Default)]
pub struct PickerSlot {
    last_id: u64,
    open: Option<PickerSession>,
}

impl PickerSlot {
    /// Opens a new session. A session that was still open is resolved to `None`
    /// and handed back so its window can be closed.
    pub fn begin(&mut self) -> (Option<PickerSession>, PickerId, oneshot::Receiver<Option<String>>) {
        let superseded = self.open.take().map(|mut session| {
            session.resolve(None);
            session
        });
        self.last_id += 1;
        let id = PickerId(self.last_id);
        let (session, rx) = PickerSession::new(id);
        self.open = Some(session);
        (superseded, id, rx)
    }

    /// Resolves and removes session `id`. Stale ids are ignored.
    pub fn finish(&mut self, id: PickerId, source: Option<String>) -> Option<PickerSession> {
        if !self.open.as_ref().is_some_and(|s| s.id == id) {
            return None;
        }
        let mut session = self.open.take()?;
        session.resolve(source);
        Some(session)
    }

    pub fn open(&self) -> Option<&PickerSession> {
        self.open.as_ref()
    }
}
