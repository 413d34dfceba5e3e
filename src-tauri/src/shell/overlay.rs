use serde::{Deserialize, Serialize};

use crate::events::CallAction;
use crate::shell::window::WindowHandle;

const LABEL_PREFIX: &str = "overlay-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Call,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRequest {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// What the overlay page reports when the user is done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    Dismiss,
    Clicked,
    AnswerCall,
    DeclineCall,
}

/// What the shell does once an overlay action has closed the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Nothing,
    FocusMain,
    Relay(CallAction),
}

impl OverlayKind {
    pub fn followup(self, action: OverlayAction) -> Followup {
        match (self, action) {
            (_, OverlayAction::Dismiss) => Followup::Nothing,
            (_, OverlayAction::Clicked) => Followup::FocusMain,
            (OverlayKind::Call, OverlayAction::AnswerCall) => Followup::Relay(CallAction::AnswerCall),
            (OverlayKind::Call, OverlayAction::DeclineCall) => {
                Followup::Relay(CallAction::DeclineCall)
            }
            (OverlayKind::Message, _) => {
                log::warn!("Call action {:?} on a message overlay, dismissing", action);
                Followup::Nothing
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

impl OverlayId {
    pub fn label(self) -> String {
        format!("{}{}", LABEL_PREFIX, self.0)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        label.strip_prefix(LABEL_PREFIX)?.parse().ok().map(Self)
    }
}

#[derive(Debug, Clone)]
pub struct LiveOverlay {
    pub id: OverlayId,
    pub request: OverlayRequest,
    pub handle: WindowHandle,
}

/// Holds at most one live overlay.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    last_id: u64,
    live: Option<LiveOverlay>,
}

impl OverlaySlot {
    /// Installs a new overlay and hands back the one it displaced.
    pub fn replace(&mut self, request: OverlayRequest) -> (Option<LiveOverlay>, OverlayId) {
        self.last_id += 1;
        let id = OverlayId(self.last_id);
        let previous = self.live.replace(LiveOverlay {
            id,
            request,
            handle: WindowHandle::overlay(id.label()),
        });
        (previous, id)
    }

    /// Removes the live overlay if it is `id`. Stale ids are ignored.
    pub fn take(&mut self, id: OverlayId) -> Option<LiveOverlay> {
        if self.live.as_ref().is_some_and(|live| live.id == id) {
            self.live.take()
        } else {
            None
        }
    }

    pub fn live(&self) -> Option<&LiveOverlay> {
        self.live.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(title: &str) -> OverlayRequest {
        OverlayRequest {
            kind: OverlayKind::Message,
            title: title.into(),
            body: String::new(),
        }
    }

    #[test]
    fn request_reads_type_field() {
        let request: OverlayRequest =
            serde_json::from_str(r#"{"type":"call","title":"Ada","body":"Incoming call"}"#)
                .unwrap();
        assert_eq!(request.kind, OverlayKind::Call);
        assert_eq!(request.title, "Ada");
    }

    #[test]
    fn labels_round_trip_and_reject_foreign_windows() {
        assert_eq!(OverlayId(7).label(), "overlay-7");
        assert_eq!(OverlayId::from_label("overlay-7"), Some(OverlayId(7)));
        assert_eq!(OverlayId::from_label("main"), None);
        assert_eq!(OverlayId::from_label("overlay-x"), None);
    }

    #[test]
    fn replace_hands_back_previous_overlay() {
        let mut slot = OverlaySlot::default();
        let (previous, first) = slot.replace(message("A"));
        assert!(previous.is_none());

        let (previous, second) = slot.replace(message("B"));
        assert_eq!(previous.map(|p| p.id), Some(first));
        assert_ne!(first, second);
        assert_eq!(slot.live().map(|l| l.request.title.as_str()), Some("B"));
    }

    #[test]
    fn take_ignores_stale_ids() {
        let mut slot = OverlaySlot::default();
        let (_, first) = slot.replace(message("A"));
        let (_, second) = slot.replace(message("B"));

        assert!(slot.take(first).is_none());
        assert!(slot.live().is_some());
        assert_eq!(slot.take(second).map(|l| l.id), Some(second));
        assert!(slot.live().is_none());
    }

    #[test]
    fn call_actions_only_relay_for_calls() {
        assert_eq!(
            OverlayKind::Call.followup(OverlayAction::AnswerCall),
            Followup::Relay(CallAction::AnswerCall)
        );
        assert_eq!(
            OverlayKind::Message.followup(OverlayAction::AnswerCall),
            Followup::Nothing
        );
        assert_eq!(
            OverlayKind::Message.followup(OverlayAction::Clicked),
            Followup::FocusMain
        );
    }
}
