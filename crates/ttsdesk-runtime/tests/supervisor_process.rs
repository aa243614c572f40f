//! Supervisor tests against real `sh` processes.

#![cfg(unix)]

use std::time::Duration;

use tokio::time::timeout;
use ttsdesk_core::{
    LogStream, ProcessError, ProcessSupervisorPort, ServerLaunch, ServerProcessState,
    SupervisorEvent, SupervisorEventReceiver,
};
use ttsdesk_runtime::{ProcessSupervisor, SupervisorConfig};

const WAIT: Duration = Duration::from_secs(5);

fn config() -> SupervisorConfig {
    SupervisorConfig::default()
        .with_grace_period(Duration::from_secs(2))
        .with_restart_settle(Duration::from_millis(10))
}

/// `sh -c <script> sh --port <port> --model_name <model>`, so the model
/// name is `$4` inside the script.
fn shell(script: &str, model: &str) -> ServerLaunch {
    ServerLaunch {
        executable: "sh".to_string(),
        base_args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        model: model.to_string(),
        port: 5002,
    }
}

async fn next_matching(
    events: &mut SupervisorEventReceiver,
    mut predicate: impl FnMut(&SupervisorEvent) -> bool,
) -> SupervisorEvent {
    timeout(WAIT, async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn is_log(event: &SupervisorEvent, stream: LogStream, text: &str) -> bool {
    matches!(event, SupervisorEvent::Log(line) if line.stream == stream && line.text == text)
}

async fn wait_for_state(supervisor: &ProcessSupervisor, wanted: ServerProcessState) {
    let mut rx = supervisor.subscribe();
    timeout(WAIT, rx.wait_for(|s| *s == wanted))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed");
}

#[tokio::test]
async fn output_lines_reach_the_event_channel() {
    let (supervisor, mut events) = ProcessSupervisor::new(config());
    supervisor
        .start(shell("echo \"model=$4\"; echo oops 1>&2; sleep 30", "tiny"))
        .await
        .unwrap();

    next_matching(&mut events, |e| {
        is_log(e, LogStream::Supervisor, "Starting TTS server with model: tiny")
    })
    .await;
    next_matching(&mut events, |e| is_log(e, LogStream::Stdout, "model=tiny")).await;

    supervisor.shutdown().await;
}

#[tokio::test]
async fn stderr_lines_are_marked() {
    let (supervisor, mut events) = ProcessSupervisor::new(config());
    supervisor
        .start(shell("echo oops 1>&2; sleep 30", "tiny"))
        .await
        .unwrap();

    let event = next_matching(&mut events, |e| is_log(e, LogStream::Stderr, "oops")).await;
    let SupervisorEvent::Log(line) = event else {
        unreachable!()
    };
    assert_eq!(line.to_string(), "[ERROR] oops");

    supervisor.shutdown().await;
}

#[tokio::test]
async fn second_start_is_rejected() {
    let (supervisor, _events) = ProcessSupervisor::new(config());
    supervisor.start(shell("sleep 30", "a")).await.unwrap();

    let err = supervisor.start(shell("sleep 30", "b")).await.unwrap_err();
    assert_eq!(err, ProcessError::AlreadyRunning);
    assert_eq!(supervisor.current_model().as_deref(), Some("a"));

    supervisor.shutdown().await;
}

#[tokio::test]
async fn running_state_carries_model_and_port() {
    let (supervisor, _events) = ProcessSupervisor::new(config());
    supervisor.start(shell("sleep 30", "a")).await.unwrap();

    assert_eq!(
        ProcessSupervisorPort::state(&supervisor),
        ServerProcessState::Running {
            model: "a".to_string(),
            port: 5002,
        }
    );
    assert!(supervisor.pid().is_some());

    supervisor.shutdown().await;
}

#[tokio::test]
async fn stop_is_idempotent() {
    let (supervisor, mut events) = ProcessSupervisor::new(config());
    supervisor.start(shell("sleep 30", "a")).await.unwrap();

    supervisor.stop().await;
    supervisor.stop().await;
    assert!(supervisor.current_model().is_none());

    wait_for_state(&supervisor, ServerProcessState::NotStarted).await;
    next_matching(&mut events, |e| {
        is_log(e, LogStream::Supervisor, "Server stopped")
    })
    .await;
}

#[tokio::test]
async fn stop_does_not_report_a_crash() {
    let (supervisor, mut events) = ProcessSupervisor::new(config());
    supervisor.start(shell("sleep 30", "a")).await.unwrap();
    supervisor.shutdown().await;

    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(
                event,
                SupervisorEvent::StateChanged(ServerProcessState::Crashed { .. })
            ),
            "unexpected crash event"
        );
    }
    assert_eq!(supervisor.state(), ServerProcessState::NotStarted);
}

#[tokio::test]
async fn self_exit_is_reported_as_crash() {
    let (supervisor, mut events) = ProcessSupervisor::new(config());
    supervisor.start(shell("exit 3", "a")).await.unwrap();

    let event = next_matching(&mut events, |e| {
        matches!(
            e,
            SupervisorEvent::StateChanged(ServerProcessState::Crashed { .. })
        )
    })
    .await;

    assert_eq!(
        event,
        SupervisorEvent::StateChanged(ServerProcessState::Crashed { exit_code: Some(3) })
    );
    assert!(supervisor.current_model().is_none());
    assert!(!supervisor.state().is_alive());

    // The slot is free again
    supervisor.start(shell("sleep 30", "b")).await.unwrap();
    supervisor.shutdown().await;
}

#[tokio::test]
async fn spawn_failure_surfaces_os_error() {
    let (supervisor, _events) = ProcessSupervisor::new(config());
    let launch = ServerLaunch {
        executable: "/nonexistent/ttsdesk-python".to_string(),
        base_args: vec![],
        model: "a".to_string(),
        port: 5002,
    };

    let err = supervisor.start(launch).await.unwrap_err();
    assert!(matches!(err, ProcessError::SpawnFailed(_)));
    assert_eq!(supervisor.state(), ServerProcessState::NotStarted);
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn restart_switches_model() {
    let (supervisor, mut events) = ProcessSupervisor::new(config());
    supervisor
        .start(shell("echo \"model=$4\"; sleep 30", "a"))
        .await
        .unwrap();
    let first_pid = supervisor.pid();

    supervisor.restart(Some("b".to_string())).await.unwrap();

    assert_eq!(supervisor.current_model().as_deref(), Some("b"));
    assert_ne!(supervisor.pid(), first_pid);
    next_matching(&mut events, |e| is_log(e, LogStream::Stdout, "model=b")).await;

    supervisor.shutdown().await;
}

#[tokio::test]
async fn restart_before_start_fails() {
    let (supervisor, _events) = ProcessSupervisor::new(config());
    assert_eq!(
        supervisor.restart(None).await,
        Err(ProcessError::NeverStarted)
    );
}

/// Whether `pid` names a live, unreaped process. Zombies count as gone.
fn process_alive(pid: u32) -> bool {
    let output = std::process::Command::new("ps")
        .args(["-o", "stat=", "-p", &pid.to_string()])
        .output()
        .expect("failed to run ps");
    let stat = String::from_utf8_lossy(&output.stdout);
    let stat = stat.trim();
    !stat.is_empty() && !stat.starts_with('Z')
}

#[tokio::test]
async fn shutdown_waits_for_a_child_stopped_through_the_port() {
    let (supervisor, mut events) = ProcessSupervisor::new(config());
    supervisor
        .start(shell(
            "trap 'sleep 1; exit 0' TERM; echo ready; while true; do sleep 0.1; done",
            "a",
        ))
        .await
        .unwrap();
    next_matching(&mut events, |e| is_log(e, LogStream::Stdout, "ready")).await;
    let pid = supervisor.pid().expect("running child has a pid");

    // The port stop returns while the child is still in its grace period
    ProcessSupervisorPort::stop(&supervisor).await;
    supervisor.shutdown().await;

    assert!(!process_alive(pid), "child {pid} outlived shutdown");
    assert_eq!(supervisor.state(), ServerProcessState::NotStarted);
}

#[tokio::test]
async fn dropping_the_supervisor_kills_the_child() {
    let (supervisor, _events) = ProcessSupervisor::new(config());
    supervisor.start(shell("sleep 30", "a")).await.unwrap();
    let pid = supervisor.pid().expect("running child has a pid");
    assert!(process_alive(pid));

    drop(supervisor);

    timeout(WAIT, async {
        while process_alive(pid) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("child survived the supervisor");
}

#[tokio::test]
async fn stopping_a_child_that_already_exited_settles() {
    for _ in 0..10 {
        let (supervisor, _events) = ProcessSupervisor::new(config());
        supervisor.start(shell("exit 0", "a")).await.unwrap();
        supervisor.stop_now();

        let mut rx = supervisor.subscribe();
        let settled = timeout(
            WAIT,
            rx.wait_for(|s| !s.is_alive() && *s != ServerProcessState::Stopping),
        )
        .await
        .expect("state stuck after stopping an exited child")
        .expect("state channel closed")
        .clone();
        assert!(matches!(
            settled,
            ServerProcessState::NotStarted | ServerProcessState::Crashed { .. }
        ));
    }
}
