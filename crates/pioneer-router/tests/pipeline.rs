//! End-to-end pipeline tests: configuration resolution through session
//! binding to export delivery, against an in-memory transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use pioneer_core::{ActiveEvent, Config, EventEnvelope, Exporter, resolve_exporters};
use pioneer_router::{
    BindingController, EventPublisher, ExportAck, ExportTransport, TransportError,
};
use pioneer_session::{Activity, Cell, CellRef, NotebookDocument, SessionTracker};

/// Records envelopes; rejects those whose event name is in `fail_on`.
#[derive(Default)]
struct RecordingTransport {
    exports: Mutex<Vec<EventEnvelope>>,
    fail_on: Vec<&'static str>,
}

impl RecordingTransport {
    fn delivered(&self) -> Vec<(String, String)> {
        self.exports
            .lock()
            .unwrap()
            .iter()
            .map(|e| {
                (
                    e.exporter.label().to_string(),
                    e.event_detail["eventName"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl ExportTransport for RecordingTransport {
    async fn export(&self, envelope: &EventEnvelope) -> Result<ExportAck, TransportError> {
        let name = envelope.event_detail["eventName"].as_str().unwrap_or("");
        if self.fail_on.contains(&name) {
            return Err(TransportError::Rejected {
                status: 502,
                body: "collector unavailable".to_string(),
            });
        }
        self.exports.lock().unwrap().push(envelope.clone());
        Ok(ExportAck {
            body: json!({"exported": true}).to_string(),
        })
    }
}

fn config(json: serde_json::Value) -> Config {
    serde_json::from_value(json).unwrap()
}

fn pipeline(
    config: Config,
    transport: Arc<RecordingTransport>,
) -> (SessionTracker, tokio::task::JoinHandle<()>) {
    let exporters = resolve_exporters(config.active_events.as_deref(), config.exporters);
    let publisher = Arc::new(EventPublisher::new(transport));
    let controller = BindingController::new(exporters, publisher);
    let (tracker, arrivals) = SessionTracker::channel();
    let run = tokio::spawn(controller.run(arrivals));
    (tracker, run)
}

fn document() -> NotebookDocument {
    NotebookDocument::new(vec![Cell::code("c1", "print(1)")])
}

#[tokio::test(start_paused = true)]
async fn inherited_and_declared_subscriptions_route_independently() {
    let config = config(json!({
        "activeEvents": [{"name": "cell_executed"}],
        "exporters": [
            {"type": "console_exporter", "id": "e1"},
            {
                "type": "file_exporter",
                "id": "e2",
                "activeEvents": [{"name": "cell_edited"}]
            }
        ]
    }));

    let transport = Arc::new(RecordingTransport::default());
    let (tracker, _run) = pipeline(config, transport.clone());

    let session = tracker.open("demo.ipynb", document());
    session.mark_revealed();
    session.mark_ready();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.emit(Activity::CellExecuted {
        cell: CellRef::new(0, "c1"),
        success: true,
        kernel_error: None,
    });
    session.emit(Activity::CellEdited {
        cell: CellRef::new(0, "c1"),
    });
    // A kind neither exporter subscribes to.
    session.emit(Activity::NotebookSaved);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 2);
    assert!(delivered.contains(&("e1".to_string(), "cell_executed".to_string())));
    assert!(delivered.contains(&("e2".to_string(), "cell_edited".to_string())));
}

#[tokio::test(start_paused = true)]
async fn empty_global_list_drops_exporters_without_subscription() {
    let config = config(json!({
        "activeEvents": [],
        "exporters": [
            {"type": "console_exporter", "id": "e1"},
            {
                "type": "file_exporter",
                "id": "e2",
                "activeEvents": [{"name": "notebook_saved"}]
            }
        ]
    }));

    let transport = Arc::new(RecordingTransport::default());
    let (tracker, _run) = pipeline(config, transport.clone());

    let session = tracker.open("demo.ipynb", document());
    session.mark_revealed();
    session.mark_ready();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.emit(Activity::NotebookSaved);
    session.emit(Activity::CellExecuted {
        cell: CellRef::new(0, "c1"),
        success: true,
        kernel_error: None,
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // e1 was dropped at resolution; only e2's subscription fires.
    assert_eq!(
        transport.delivered(),
        vec![("e2".to_string(), "notebook_saved".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn transport_failure_does_not_block_later_publishes() {
    let config = config(json!({
        "activeEvents": [
            {"name": "cell_executed"},
            {"name": "cell_edited"}
        ],
        "exporters": [{"type": "console_exporter", "id": "e1"}]
    }));

    let transport = Arc::new(RecordingTransport {
        fail_on: vec!["cell_executed"],
        ..Default::default()
    });
    let (tracker, _run) = pipeline(config, transport.clone());

    let session = tracker.open("demo.ipynb", document());
    session.mark_revealed();
    session.mark_ready();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // First publish is rejected by the collector; the second still goes out.
    session.emit(Activity::CellExecuted {
        cell: CellRef::new(0, "c1"),
        success: true,
        kernel_error: None,
    });
    session.emit(Activity::CellEdited {
        cell: CellRef::new(0, "c1"),
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        transport.delivered(),
        vec![("e1".to_string(), "cell_edited".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn closing_the_session_detaches_every_listener() {
    let config = config(json!({
        "activeEvents": [{"name": "notebook_saved"}],
        "exporters": [{"type": "console_exporter", "id": "e1"}]
    }));

    let transport = Arc::new(RecordingTransport::default());
    let (tracker, _run) = pipeline(config, transport.clone());

    let session = tracker.open("demo.ipynb", document());
    session.mark_revealed();
    session.mark_ready();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.emit(Activity::NotebookSaved);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(transport.delivered().len(), 1);

    session.close();
    tokio::time::sleep(Duration::from_millis(10)).await;
    session.emit(Activity::NotebookSaved);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(transport.delivered().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn whole_notebook_flag_controls_snapshot_inclusion() {
    let config = config(json!({
        "activeEvents": [
            {"name": "cell_executed", "logWholeNotebook": true},
            {"name": "cell_edited"}
        ],
        "exporters": [{"type": "console_exporter", "id": "e1"}]
    }));

    let transport = Arc::new(RecordingTransport::default());
    let (tracker, _run) = pipeline(config, transport.clone());

    let session = tracker.open("demo.ipynb", document());
    session.mark_revealed();
    session.mark_ready();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.emit(Activity::CellExecuted {
        cell: CellRef::new(0, "c1"),
        success: true,
        kernel_error: None,
    });
    session.emit(Activity::CellEdited {
        cell: CellRef::new(0, "c1"),
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let exports = transport.exports.lock().unwrap();
    assert_eq!(exports.len(), 2);
    for envelope in exports.iter() {
        let name = envelope.event_detail["eventName"].as_str().unwrap();
        let content = &envelope.notebook_state.notebook_content;
        if name == "cell_executed" {
            let content = content.as_ref().expect("snapshot requested");
            assert_eq!(content["cells"][0]["source"], "print(1)");
        } else {
            assert!(content.is_none());
        }
        assert_eq!(envelope.notebook_state.notebook_path, "demo.ipynb");
    }
}

#[tokio::test(start_paused = true)]
async fn sessions_bind_independently() {
    let config = config(json!({
        "activeEvents": [{"name": "notebook_saved"}],
        "exporters": [{"type": "console_exporter", "id": "e1"}]
    }));

    let transport = Arc::new(RecordingTransport::default());
    let (tracker, _run) = pipeline(config, transport.clone());

    let first = tracker.open("first.ipynb", document());
    let second = tracker.open("second.ipynb", document());
    for session in [&first, &second] {
        session.mark_revealed();
        session.mark_ready();
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    first.close();
    tokio::time::sleep(Duration::from_millis(10)).await;
    second.emit(Activity::NotebookSaved);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let paths: Vec<String> = transport
        .exports
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.notebook_state.notebook_path.clone())
        .collect();
    assert_eq!(paths, vec!["second.ipynb"]);
}

/// Exporter config (`type`, `args`) travels verbatim inside each envelope.
#[tokio::test(start_paused = true)]
async fn exporter_descriptor_is_forwarded_verbatim() {
    let args = json!({"path": "/var/log/pioneer/events.log"});
    let exporters = resolve_exporters(
        Some(&[ActiveEvent::named("notebook_saved")]),
        vec![Exporter {
            kind: "file_exporter".to_string(),
            id: None,
            args: Some(args.clone()),
            active_events: None,
        }],
    );

    let transport = Arc::new(RecordingTransport::default());
    let publisher = Arc::new(EventPublisher::new(transport.clone()));
    let controller = BindingController::new(exporters, publisher);

    let (tracker, arrivals) = SessionTracker::channel();
    let _run = tokio::spawn(controller.run(arrivals));

    let session = tracker.open("demo.ipynb", document());
    session.mark_revealed();
    session.mark_ready();
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.emit(Activity::NotebookSaved);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let exports = transport.exports.lock().unwrap();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].exporter.kind, "file_exporter");
    assert_eq!(exports[0].exporter.args, Some(args));
}
