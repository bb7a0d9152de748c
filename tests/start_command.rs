#![cfg(unix)]

mod common;
use crate::common::{CaptureSink, ConfigFileBuilder, GroupBuilder, ProjectBuilder, TestResult, init_tracing, with_timeout};

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use vunat::commands::start_project;
use vunat::config::ConfigFile;
use vunat::errors::VunatError;

fn config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_project(
            "ok",
            ProjectBuilder::new()
                .with_group(GroupBuilder::new("hello").cmd("echo hi").build())
                .build(),
        )
        .with_project(
            "broken",
            ProjectBuilder::new()
                .with_group(GroupBuilder::new("bad").cmd("false").build())
                .build(),
        )
        .with_project(
            "forever",
            ProjectBuilder::new()
                .with_group(GroupBuilder::new("svc").cmd("sleep 30").build())
                .build(),
        )
        .build()
}

#[tokio::test]
async fn successful_project_prints_banner_and_output() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();

    with_timeout(start_project(config(), "ok", sink.as_sink(), CancellationToken::new())).await?;

    assert_eq!(sink.stdout()[0], "Starting project: ok\n");
    assert!(sink.contains("[hello] hi"));
    Ok(())
}

#[tokio::test]
async fn cancellation_is_a_clean_exit() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            cancel.cancel();
        });
    }

    with_timeout(start_project(config(), "forever", sink.as_sink(), cancel)).await?;

    assert!(sink.contains("\nAll processes stopped."));
    Ok(())
}

#[tokio::test]
async fn process_failure_is_an_error_naming_group_and_command() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();

    let err = with_timeout(start_project(
        config(),
        "broken",
        sink.as_sink(),
        CancellationToken::new(),
    ))
    .await
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("group bad"), "{msg}");
    assert!(msg.contains("\"false\""), "{msg}");
    assert!(matches!(
        err.downcast_ref::<VunatError>(),
        Some(VunatError::ProcessExitFailure { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn unknown_project_is_an_error() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();

    let err = start_project(config(), "nope", sink.as_sink(), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "unknown project: nope");
    Ok(())
}
