// tests/flow_controller.rs

use std::error::Error;

use serde_json::json;

use pixrun::errors::PixError;
use pixrun::exec::RunnerVariant;
use pixrun::flow::FlowState;
use pixrun::types::RawOutput;
use pixrun_test_utils::builders::{fake_controller, mapping, test_robot_path, RequestBuilder};
use pixrun_test_utils::{init_tracing, FakeBackend, StubLocator};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn exit_zero_reaches_succeeded() -> TestResult {
    init_tracing();
    let backend = FakeBackend::new();
    backend.push_output(RawOutput {
        exit_code: 0,
        stdout: b"done".to_vec(),
        stderr: Vec::new(),
    });
    let controller = fake_controller(StubLocator::missing(), backend.clone());

    let run = controller.run(RequestBuilder::new("task.pix").build()).await;

    assert_eq!(
        run.states(),
        &[
            FlowState::Start,
            FlowState::ParametersBound,
            FlowState::CommandBuilt,
            FlowState::RunningHeadless,
            FlowState::Succeeded,
        ]
    );
    let result = run.into_result()?;
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "done");
    assert_eq!(backend.executed().len(), 1);
    Ok(())
}

#[tokio::test]
async fn exit_two_reaches_failed_with_code_and_stderr() -> TestResult {
    init_tracing();
    let backend = FakeBackend::exiting(2, "script crashed");
    let controller = fake_controller(StubLocator::missing(), backend);

    let run = controller.run(RequestBuilder::new("task.pix").build()).await;

    assert_eq!(run.final_state(), FlowState::Failed);
    assert_eq!(run.variant(), Some(RunnerVariant::Headless));
    let err = run.into_result().unwrap_err();
    assert_eq!(err.exit_code(), Some(2));
    assert_eq!(err.stderr(), Some("script crashed"));
    assert!(err.to_string().contains("exit_code=2"));
    Ok(())
}

#[tokio::test]
async fn scenario_routes_to_headless_with_json_params() -> TestResult {
    init_tracing();
    let backend = FakeBackend::new();
    let controller = fake_controller(StubLocator::missing(), backend.clone());

    let mut params = mapping(json!({
        "script_path": "task.pix",
        "script_parameters": {"time": 120},
        "need_gui": false,
    }));
    params.insert(
        "robot_path".into(),
        json!(test_robot_path().to_string_lossy()),
    );

    let run = controller.run_params(&params).await;

    assert!(run.succeeded());
    assert_eq!(run.variant(), Some(RunnerVariant::Headless));
    let executed = backend.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0].args(),
        &["-f".to_string(), "task.pix".to_string(), r#"-p={"time": 120}"#.to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn gui_request_routes_to_gui_runner() -> TestResult {
    init_tracing();
    let controller = fake_controller(StubLocator::missing(), FakeBackend::new());

    let run = controller
        .run(RequestBuilder::new("task.pix").gui(true).build())
        .await;

    assert!(run.states().contains(&FlowState::RunningGui));
    assert!(!run.states().contains(&FlowState::RunningHeadless));
    assert!(run.succeeded());
    Ok(())
}

#[tokio::test]
async fn locator_failure_fails_without_running_anything() -> TestResult {
    init_tracing();
    let backend = FakeBackend::new();
    let locator = StubLocator::missing();
    let controller = fake_controller(locator.clone(), backend.clone());

    let run = controller
        .run(RequestBuilder::new("task.pix").without_robot_path().build())
        .await;

    assert_eq!(
        run.states(),
        &[FlowState::Start, FlowState::ParametersBound, FlowState::Failed]
    );
    assert!(matches!(run.result(), Err(PixError::ExecutorNotFound(_))));
    assert_eq!(locator.calls(), 1);
    assert!(backend.executed().is_empty());
    Ok(())
}

#[tokio::test]
async fn unsupported_parameters_fail_at_binding() -> TestResult {
    init_tracing();
    let backend = FakeBackend::new();
    let controller = fake_controller(StubLocator::missing(), backend.clone());

    let run = controller
        .run_params(&mapping(json!({
            "script_path": "task.pix",
            "script_parameters": 42,
        })))
        .await;

    assert_eq!(run.states(), &[FlowState::Start, FlowState::Failed]);
    assert!(matches!(run.result(), Err(PixError::InvalidParameter(_))));
    assert!(backend.executed().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_script_path_fails_at_binding() -> TestResult {
    init_tracing();
    let controller = fake_controller(StubLocator::missing(), FakeBackend::new());

    let run = controller.run_params(&mapping(json!({"need_gui": "yes"}))).await;

    assert_eq!(run.final_state(), FlowState::Failed);
    assert!(matches!(run.result(), Err(PixError::ConfigError(_))));
    Ok(())
}

#[tokio::test]
async fn located_robot_is_used_when_request_has_none() -> TestResult {
    init_tracing();
    let backend = FakeBackend::new();
    let robot = test_robot_path();
    let locator = StubLocator::found(&robot);
    let controller = fake_controller(locator.clone(), backend.clone());

    controller
        .execute(RequestBuilder::new("task.pix").without_robot_path().build())
        .await?;

    assert_eq!(locator.calls(), 1);
    assert_eq!(backend.executed()[0].program(), robot.to_string_lossy());
    Ok(())
}

#[derive(Debug)]
struct SlowLocator(std::path::PathBuf);

impl pixrun::locate::LocatorStrategy for SlowLocator {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn locate(&self) -> pixrun::errors::Result<std::path::PathBuf> {
        std::thread::sleep(std::time::Duration::from_millis(300));
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn blocking_locator_does_not_stall_the_runtime() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    init_tracing();
    let controller = pixrun::flow::FlowController::new(
        Arc::new(SlowLocator(test_robot_path())),
        Arc::new(FakeBackend::new()),
        encoding_rs::UTF_8,
    );

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = Arc::clone(&ticks);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let run = controller
        .run(RequestBuilder::new("task.pix").without_robot_path().build())
        .await;
    ticker.abort();

    assert!(run.succeeded());
    assert!(ticks.load(Ordering::SeqCst) >= 5, "timer starved while locating");
}
