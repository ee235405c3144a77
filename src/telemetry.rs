//! Telemetry domain: the learner event model consumed by the summarizer and the
//! session telemetry sink used when switching profiles.

mod types;

pub mod events;
pub mod service;

pub use events::{
    Actor, CorrelationData, Eid, EventData, ProducerData, SummaryEntry, Telemetry, TelemetryContext,
    TelemetryObject,
};
pub use service::{SessionTelemetry, TelemetryService};
pub use types::now_millis;
