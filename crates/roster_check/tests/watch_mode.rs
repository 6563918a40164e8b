use pretty_assertions::assert_eq;
use roster_check::report::ReportSink;
use roster_check::settings::Settings;
use roster_check::watch::{WatchController, WatchTarget};
use roster_contract::PassReport;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
enum SinkEvent {
    Status,
    Report(PassReport),
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl CollectingSink {
    fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().expect("sink lock").clone()
    }
}

impl ReportSink for CollectingSink {
    fn status(&self, _message: &str) {
        self.events.lock().expect("sink lock").push(SinkEvent::Status);
    }

    fn publish(&self, report: &PassReport) {
        self.events
            .lock()
            .expect("sink lock")
            .push(SinkEvent::Report(report.clone()));
    }
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("contributors")).expect("create records dir");
    fs::write(dir.path().join("projects.yaml"), "projects: [core]\n").expect("write registry");
    fs::write(dir.path().join("contributors/jane.png"), b"png").expect("write avatar");
    fs::write(
        dir.path().join("contributors/jane.yaml"),
        "name: Jane\navatar: jane.png\nroles:\n  core: [maintainer]\n",
    )
    .expect("write record");
    dir
}

fn settings_for(dir: &tempfile::TempDir) -> Settings {
    let mut settings = Settings::defaults(dir.path());
    settings.pacing_delay = Duration::from_millis(50);
    settings.poll_interval = Duration::from_millis(20);
    settings
}

#[tokio::test]
async fn rapid_requests_publish_only_the_latest_pass() {
    let dir = workspace();
    let sink = Arc::new(CollectingSink::default());
    let mut controller = WatchController::new(settings_for(&dir), sink.clone());

    controller.request_pass();
    fs::write(
        dir.path().join("contributors/jane.yaml"),
        "avatar: jane.png\nroles:\n  core: [maintainer]\n",
    )
    .expect("rewrite record");
    controller.request_pass();
    controller.wait_idle().await;

    let events = sink.events();
    assert_eq!(events.len(), 2, "one status line and one report: {events:?}");
    assert_eq!(events[0], SinkEvent::Status);
    let SinkEvent::Report(report) = &events[1] else {
        panic!("expected a report, got {events:?}");
    };
    assert_eq!(report.files[0].errors, vec!["name: Required".to_string()]);
}

#[tokio::test]
async fn change_during_a_running_pass_publishes_only_the_newer_input() {
    const RECORDS: usize = 2000;
    let dir = workspace();
    for index in 0..RECORDS {
        fs::write(
            dir.path().join(format!("contributors/r{index:05}.yaml")),
            "name: Roster\navatar: jane.png\nroles:\n  core: [maintainer]\n",
        )
        .expect("write record");
    }
    let mut settings = settings_for(&dir);
    settings.pacing_delay = Duration::from_millis(1);
    let sink = Arc::new(CollectingSink::default());
    let mut controller = WatchController::new(settings, sink.clone());

    controller.request_pass();
    tokio::time::timeout(Duration::from_secs(10), async {
        while sink.events().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("first pass starts");
    assert_eq!(sink.events(), vec![SinkEvent::Status]);
    // Let the first pass get into its per-file checks before the change lands.
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    fs::write(
        dir.path().join("contributors/r00000.yaml"),
        "avatar: jane.png\nroles:\n  core: [maintainer]\n",
    )
    .expect("rewrite record");
    controller.request_pass();
    controller.wait_idle().await;

    let events = sink.events();
    let statuses = events
        .iter()
        .filter(|event| matches!(event, SinkEvent::Status))
        .count();
    let reports: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            SinkEvent::Report(report) => Some(report),
            SinkEvent::Status => None,
        })
        .collect();
    assert_eq!(statuses, 2);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total(), RECORDS + 1);
    assert_eq!(reports[0].files[0].file, "contributors/jane.yaml");
    assert_eq!(reports[0].files[1].file, "contributors/r00000.yaml");
    assert_eq!(reports[0].files[1].errors, vec!["name: Required".to_string()]);
    assert_eq!(reports[0].valid_count(), RECORDS);
}

#[tokio::test]
async fn sequential_requests_each_publish() {
    let dir = workspace();
    let sink = Arc::new(CollectingSink::default());
    let mut controller = WatchController::new(settings_for(&dir), sink.clone());

    controller.request_pass();
    controller.wait_idle().await;
    assert!(!controller.is_running());
    controller.request_pass();
    controller.wait_idle().await;

    let reports = sink
        .events()
        .into_iter()
        .filter(|event| matches!(event, SinkEvent::Report(_)))
        .count();
    assert_eq!(reports, 2);
}

#[tokio::test]
async fn watches_cover_records_and_registry_and_fire_on_change() {
    let dir = workspace();
    let settings = settings_for(&dir);
    let records_dir = settings.records_dir.clone();
    let mut controller = WatchController::new(settings, Arc::new(CollectingSink::default()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    controller.start_watches(&tx).expect("start watches");
    assert_eq!(controller.watched().len(), 2);

    tokio::time::sleep(Duration::from_millis(60)).await;
    fs::write(
        dir.path().join("contributors/sam.yaml"),
        "name: Sam\navatar: sam.png\nroles: {}\n",
    )
    .expect("write record");

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event before timeout")
        .expect("channel open");
    assert_eq!(event.target, WatchTarget::RecordDir(records_dir));

    controller.shutdown();
    assert!(controller.watched().is_empty());
}
