//! The sweep catches events whose immediate fan-out failed.

use super::helpers::{App, app};
use atelier::config::PipelineConfig;
use atelier::tracker::services::CreateProjectRequest;
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manual_sweep_delivers_missed_alerts_once(app: App) {
    app.audit.fail_deliveries(true);
    app.service
        .create_project(&app.owner, CreateProjectRequest::new("Website"))
        .await
        .expect("create project");
    app.recorded_events(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.audit.fail_deliveries(false);

    app.pipeline.processor().run_once().await;
    app.pipeline.processor().run_once().await;

    let events = app.settled_events(1).await;
    assert!(events.iter().all(|event| event.processed_at.is_some()));
    assert_eq!(
        app.admin_messages(),
        vec!["[PROYECTO CREADO] olga Created project: Website".to_owned()]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn running_sweep_recovers_without_intervention() {
    let app = App::new(
        &PipelineConfig::default().with_sweep_interval(Duration::from_millis(20)),
    );
    app.audit.fail_marking(true);
    app.service
        .create_project(&app.owner, CreateProjectRequest::new("Website"))
        .await
        .expect("create project");
    app.recorded_events(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.audit.fail_marking(false);

    app.pipeline.sweep().ensure_started().expect("start sweep");
    app.settled_events(1).await;
    assert!(app.pipeline.sweep().shutdown().await);

    assert_eq!(app.admin_messages().len(), 1);
}
