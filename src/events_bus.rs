//! In-process event bus for domain events published by the SDK.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventNamespace {
    Content,
}

/// Content-namespace events.
///
/// The wire payload of `CourseStateUpdated` names its field `contentId` while carrying
/// the course identifier; existing subscribers read that key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentEvent {
    CourseStateUpdated {
        #[serde(rename = "contentId")]
        course_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusEvent {
    pub namespace: EventNamespace,
    pub event: ContentEvent,
}

impl BusEvent {
    pub fn course_state_updated(course_id: impl Into<String>) -> Self {
        Self {
            namespace: EventNamespace::Content,
            event: ContentEvent::CourseStateUpdated {
                course_id: course_id.into(),
            },
        }
    }
}

/// Fire-and-forget publication of domain events.
pub trait EventsBusService: Send + Sync {
    fn emit(&self, event: BusEvent);
}

#[derive(Clone)]
pub struct EventsBus {
    sender: Sender<BusEvent>,
}

impl EventsBus {
    pub fn new_pair() -> (Self, Receiver<BusEvent>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }
}

impl EventsBusService for EventsBus {
    fn emit(&self, event: BusEvent) {
        if let Err(err) = self.sender.send(event) {
            warn!(event = ?err.0, "event bus has no subscriber; dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn course_state_updated_wire_shape() {
        let event = BusEvent::course_state_updated("co1");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "namespace": "CONTENT",
                "event": { "type": "COURSE_STATE_UPDATED", "payload": { "contentId": "co1" } }
            })
        );
    }

    #[test]
    fn emitted_events_reach_the_receiver_in_order() {
        let (bus, rx) = EventsBus::new_pair();
        bus.emit(BusEvent::course_state_updated("a"));
        bus.emit(BusEvent::course_state_updated("b"));
        let received: Vec<BusEvent> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                BusEvent::course_state_updated("a"),
                BusEvent::course_state_updated("b")
            ]
        );
    }

    #[test]
    fn emit_without_receiver_does_not_panic() {
        let (bus, rx) = EventsBus::new_pair();
        drop(rx);
        bus.emit(BusEvent::course_state_updated("a"));
    }
}
