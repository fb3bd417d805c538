//! Progress events emitted while a PR is analysed

use crate::types::AnalysisResult;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// One step of an analysis run
///
/// A fresh run emits `Start`, one `Progress` per file, `Synthesizing` and
/// `Done`. A cached result is delivered as a lone `Done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisEvent {
    Start {
        total: usize,
    },
    Progress {
        completed: usize,
        total: usize,
        file: String,
    },
    Synthesizing,
    Done {
        data: AnalysisResult,
    },
}

/// Send an event, ignoring a receiver that has gone away
pub(crate) fn emit(events: &UnboundedSender<AnalysisEvent>, event: AnalysisEvent) {
    if events.send(event).is_err() {
        debug!("Analysis event receiver dropped, continuing without progress updates");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let start = serde_json::to_value(AnalysisEvent::Start { total: 3 }).unwrap();
        assert_eq!(start, serde_json::json!({ "type": "start", "total": 3 }));

        let progress = serde_json::to_value(AnalysisEvent::Progress {
            completed: 1,
            total: 3,
            file: "a.rs".to_string(),
        })
        .unwrap();
        assert_eq!(
            progress,
            serde_json::json!({ "type": "progress", "completed": 1, "total": 3, "file": "a.rs" })
        );

        let synth = serde_json::to_value(AnalysisEvent::Synthesizing).unwrap();
        assert_eq!(synth, serde_json::json!({ "type": "synthesizing" }));
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        // Must not panic
        emit(&tx, AnalysisEvent::Synthesizing);
    }
}
