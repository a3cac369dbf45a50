// tests/process_runner.rs
//
// Runs real child processes through `sh`, so these only run on Unix.
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;

use pixrun::errors::PixError;
use pixrun::exec::{ProcessRunner, RealProcessBackend, RunnerVariant};
use pixrun::types::CommandLine;
use pixrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn sh(script: &str) -> CommandLine {
    CommandLine::from_tokens(["sh", "-c", script]).expect("non-empty command")
}

fn runner(variant: RunnerVariant, label: &str) -> ProcessRunner {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes()).expect("known label");
    ProcessRunner::new(variant, Arc::new(RealProcessBackend::new()), encoding)
}

#[tokio::test]
async fn successful_process_returns_captured_output() -> TestResult {
    init_tracing();
    let result = with_timeout(
        runner(RunnerVariant::Headless, "utf-8").run(&sh("echo hello; echo warn >&2")),
    )
    .await?;

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "hello\n");
    assert_eq!(result.stderr, "warn\n");
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_process_execution_error() {
    init_tracing();
    let err = with_timeout(
        runner(RunnerVariant::Gui, "utf-8").run(&sh("echo oops >&2; exit 2")),
    )
    .await
    .unwrap_err();

    match err {
        PixError::ProcessExecution { exit_code, stderr } => {
            assert_eq!(exit_code, 2);
            assert_eq!(stderr, "oops\n");
        }
        other => panic!("expected ProcessExecution, got {other:?}"),
    }
}

#[tokio::test]
async fn output_is_decoded_with_legacy_codepage() -> TestResult {
    init_tracing();
    // "Привет" in cp866, written as raw bytes.
    let result = with_timeout(
        runner(RunnerVariant::Headless, "cp866")
            .run(&sh(r"printf '\217\340\250\242\245\342'")),
    )
    .await?;

    assert_eq!(result.stdout, "Привет");
    Ok(())
}

#[tokio::test]
async fn missing_executable_is_spawn_failure() {
    init_tracing();
    let cmd = CommandLine::from_tokens(["/definitely/not/here/Robot.exe", "-f", "task.pix"])
        .expect("non-empty command");

    let err = with_timeout(runner(RunnerVariant::Headless, "utf-8").run(&cmd))
        .await
        .unwrap_err();

    match err {
        PixError::SpawnFailed { program, .. } => {
            assert_eq!(program, "/definitely/not/here/Robot.exe");
        }
        other => panic!("expected SpawnFailed, got {other:?}"),
    }
}
