//! Core event to API event translation

use std::io::Write;
use tracing::warn;
use walkrace_api::{Event, EventPayload, SessionSummary};
use walkrace_core::CoreEvent;

/// Translate a core event into the payload presentation clients see
pub fn to_payload(event: CoreEvent) -> EventPayload {
    match event {
        CoreEvent::SessionStarted {
            session_id,
            started_at,
        } => EventPayload::SessionStarted {
            session_id,
            started_at,
        },
        CoreEvent::StepsUpdated {
            session_steps,
            daily_steps,
        } => EventPayload::StepsUpdated {
            session_steps,
            daily_steps,
        },
        CoreEvent::SessionStopped(result) => EventPayload::SessionStopped(SessionSummary {
            session_id: result.session_id,
            session_steps: result.session_steps,
            duration: result.duration,
        }),
        CoreEvent::NoticeRaised(notice) => EventPayload::NoticeRaised(notice),
        CoreEvent::StandingsChanged { players } => EventPayload::StandingsChanged { players },
        CoreEvent::ChatPosted(line) => EventPayload::ChatPosted(line),
        CoreEvent::WinnerDeclared(winner) => EventPayload::WinnerDeclared(winner),
        CoreEvent::DailyReset => EventPayload::DailyReset,
    }
}

/// Writes events as JSON lines
pub struct EventPublisher<W> {
    out: W,
}

impl<W: Write> EventPublisher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn publish(&mut self, payload: EventPayload) {
        let event = Event::new(payload);
        let result = serde_json::to_string(&event)
            .map_err(std::io::Error::from)
            .and_then(|line| writeln!(self.out, "{line}"))
            .and_then(|()| self.out.flush());

        // The game keeps running if the consumer goes away
        if let Err(e) = result {
            warn!(error = %e, "Failed to publish event");
        }
    }

    pub fn publish_all(&mut self, events: impl IntoIterator<Item = CoreEvent>) {
        for event in events {
            self.publish(to_payload(event));
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
