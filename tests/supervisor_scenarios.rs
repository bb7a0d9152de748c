#![cfg(unix)]

mod common;
use crate::common::{CaptureSink, GroupBuilder, ProjectBuilder, TestResult, init_tracing, with_timeout};

use std::path::Path;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use vunat::errors::VunatError;
use vunat::project::{Project, StaticResolver};
use vunat::supervisor::Supervisor;

fn supervisor(sink: &CaptureSink) -> Supervisor<StaticResolver> {
    Supervisor::new(StaticResolver::new(), sink.as_sink())
}

async fn run(project: &Project, sink: &CaptureSink) -> Result<(), VunatError> {
    with_timeout(supervisor(sink).start(project, CancellationToken::new())).await
}

/// Commands are split on whitespace only, so anything needing shell syntax
/// goes into a script run as `sh <path>`.
fn shell_script(dir: &Path, name: &str, body: &str) -> std::io::Result<String> {
    let path = dir.join(name);
    std::fs::write(&path, body)?;
    Ok(format!("sh {}", path.display()))
}

#[tokio::test]
async fn echo_completes_with_prefixed_output() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("group").cmd("echo hello").build())
        .build();

    run(&project, &sink).await?;

    assert!(sink.stdout().contains(&"[group] hello".to_string()));
    assert!(sink.contains("[group] Started"));
    Ok(())
}

#[tokio::test]
async fn failing_command_kills_long_running_sibling() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("svc").cmd("sleep 30").cmd("false").build())
        .build();

    // `sleep 30` would outlive the 5s test timeout unless it is killed.
    let err = run(&project, &sink).await.unwrap_err();

    match err {
        VunatError::ProcessExitFailure {
            group,
            command,
            code,
            ..
        } => {
            assert_eq!(group, "svc");
            assert_eq!(command, "false");
            assert_eq!(code, Some(1));
        }
        other => panic!("expected ProcessExitFailure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn failure_in_later_group_kills_earlier_groups() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("db").cmd("sleep 30").build())
        .with_group(GroupBuilder::new("app").cmd("sleep 0.2").cmd("false").build())
        .build();

    let err = run(&project, &sink).await.unwrap_err();

    assert!(
        matches!(err, VunatError::ProcessExitFailure { ref group, .. } if group == "app"),
        "unexpected error: {err:?}"
    );
    Ok(())
}

#[tokio::test]
async fn start_failure_skips_remaining_groups() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(
            GroupBuilder::new("first")
                .cmd("vunat-test-binary-that-does-not-exist --flag")
                .build(),
        )
        .with_group(GroupBuilder::new("second").cmd("echo two").build())
        .build();

    let err = run(&project, &sink).await.unwrap_err();

    match err {
        VunatError::StartFailure { group, command, .. } => {
            assert_eq!(group, "first");
            assert_eq!(command, "vunat-test-binary-that-does-not-exist --flag");
        }
        other => panic!("expected StartFailure, got {other:?}"),
    }
    assert!(sink.contains("[first] Starting in: ."));
    assert!(!sink.contains("[first] Started"));
    assert!(!sink.contains("[second] Starting in: ."));
    assert!(!sink.contains("[second] two"));
    Ok(())
}

#[tokio::test]
async fn start_failure_kills_processes_of_earlier_groups() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("db").cmd("sleep 30").build())
        .with_group(
            GroupBuilder::new("app")
                .cmd("vunat-test-binary-that-does-not-exist")
                .build(),
        )
        .build();

    let err = run(&project, &sink).await.unwrap_err();

    assert!(matches!(err, VunatError::StartFailure { ref group, .. } if group == "app"));
    Ok(())
}

#[tokio::test]
async fn external_cancellation_stops_everything() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("a").cmd("sleep 30").build())
        .with_group(GroupBuilder::new("b").cmd("sleep 30").cmd("sleep 30").build())
        .build();

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            cancel.cancel();
        });
    }

    let err = with_timeout(supervisor(&sink).start(&project, cancel))
        .await
        .unwrap_err();

    assert!(err.is_cancelled(), "expected Cancelled, got {err:?}");
    assert!(sink.contains("All groups started."));
    Ok(())
}

#[tokio::test]
async fn already_cancelled_token_starts_nothing() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("a").cmd("echo should-not-run").build())
        .build();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = with_timeout(supervisor(&sink).start(&project, cancel))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(sink.lines().is_empty());
    Ok(())
}

#[tokio::test]
async fn groups_start_in_declared_order() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let names = ["g1", "g2", "g3", "g4"];
    let mut builder = ProjectBuilder::new();
    for name in names {
        builder = builder.with_group(GroupBuilder::new(name).cmd(&format!("echo {name}")).build());
    }

    run(&builder.build(), &sink).await?;

    let mut last = None;
    for name in names {
        let starting = sink
            .position(&format!("[{name}] Starting in: ."))
            .expect("starting marker");
        let started = sink.position(&format!("[{name}] Started")).expect("started marker");
        assert!(starting < started);
        if let Some(prev) = last {
            assert!(prev < starting, "{name} started before the previous group finished launching");
        }
        last = Some(started);
    }
    Ok(())
}

#[tokio::test]
async fn exactly_one_error_is_reported_for_concurrent_failures() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(
            GroupBuilder::new("both")
                .cmd("false")
                .cmd("ls /vunat/definitely/missing/path")
                .build(),
        )
        .build();

    let err = run(&project, &sink).await.unwrap_err();

    match err {
        VunatError::ProcessExitFailure { command, .. } => {
            assert!(
                command == "false" || command == "ls /vunat/definitely/missing/path",
                "unexpected command {command}"
            );
        }
        other => panic!("expected ProcessExitFailure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn commands_run_in_the_group_directory() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let canonical = dir.path().canonicalize()?;
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("wd").dir(dir.path()).cmd("pwd").build())
        .build();

    run(&project, &sink).await?;

    let expected = format!("[wd] {}", canonical.display());
    assert!(sink.stdout().contains(&expected), "stdout: {:?}", sink.stdout());
    assert!(sink.contains(&format!("[wd] Starting in: {}", dir.path().display())));
    Ok(())
}

#[tokio::test]
async fn blank_commands_are_skipped() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("empty").cmd("").cmd("   ").build())
        .with_group(GroupBuilder::new("real").cmd("   ").cmd("echo ok").build())
        .build();

    run(&project, &sink).await?;

    assert!(sink.contains("[empty] Started"));
    assert!(sink.stdout().contains(&"[real] ok".to_string()));
    Ok(())
}

#[tokio::test]
async fn stderr_is_forwarded_to_stderr() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(
            GroupBuilder::new("err")
                .cmd("ls /vunat/definitely/missing/path")
                .build(),
        )
        .build();

    let _ = run(&project, &sink).await.unwrap_err();

    let stderr = sink.stderr();
    assert!(!stderr.is_empty());
    assert!(stderr.iter().all(|l| l.starts_with("[err] ")));
    assert!(!sink.stdout().iter().any(|l| l.contains("missing/path")));
    Ok(())
}

#[tokio::test]
async fn empty_project_completes_immediately() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();

    run(&Project::default(), &sink).await?;

    assert_eq!(sink.stdout(), vec!["All groups started.".to_string()]);
    Ok(())
}

#[tokio::test]
async fn unknown_project_is_reported_by_name() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();

    let err = supervisor(&sink)
        .start_by_name("ghost", CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, VunatError::ProjectNotFound(ref name) if name == "ghost"));
    assert!(sink.lines().is_empty());
    Ok(())
}

#[tokio::test]
async fn start_failure_kills_started_siblings_in_same_group() -> TestResult {
    init_tracing();
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(
            GroupBuilder::new("svc")
                .cmd("sleep 30")
                .cmd("vunat-test-binary-that-does-not-exist")
                .build(),
        )
        .build();

    let began = Instant::now();
    let err = run(&project, &sink).await.unwrap_err();

    assert!(
        matches!(err, VunatError::StartFailure { ref group, ref command, .. }
            if group == "svc" && command == "vunat-test-binary-that-does-not-exist"),
        "unexpected error: {err:?}"
    );
    assert!(
        began.elapsed() < Duration::from_secs(3),
        "sibling was not killed promptly: {:?}",
        began.elapsed()
    );
    assert!(!sink.contains("[svc] Started"));
    Ok(())
}

#[tokio::test]
async fn invalid_utf8_output_does_not_break_the_process() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    // The pause lets the forwarder consume the bad line before `after` is written.
    let cmd = shell_script(
        dir.path(),
        "bytes.sh",
        "printf 'ok\\n\\377\\376\\n'\nsleep 0.3\necho after\n",
    )?;
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("bin").cmd(&cmd).build())
        .build();

    run(&project, &sink).await?;

    let stdout = sink.stdout();
    assert!(stdout.contains(&"[bin] ok".to_string()));
    assert!(stdout.contains(&"[bin] \u{FFFD}\u{FFFD}".to_string()));
    assert!(stdout.contains(&"[bin] after".to_string()));
    Ok(())
}

#[tokio::test]
async fn background_grandchild_does_not_delay_completion() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    // The backgrounded `sleep` inherits stdout and holds the pipe open.
    let cmd = shell_script(dir.path(), "bg.sh", "sleep 3 &\necho parent-done\n")?;
    let sink = CaptureSink::new();
    let project = ProjectBuilder::new()
        .with_group(GroupBuilder::new("bg").cmd(&cmd).build())
        .build();

    let began = Instant::now();
    run(&project, &sink).await?;

    assert!(
        began.elapsed() < Duration::from_secs(2),
        "completion waited on the grandchild's pipe: {:?}",
        began.elapsed()
    );
    assert!(sink.stdout().contains(&"[bg] parent-done".to_string()));
    Ok(())
}
