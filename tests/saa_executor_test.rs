// Integration tests for the SAA executor against stand-in scripts

#![cfg(unix)]

mod common;

use bmc_cert_sync::remediation::{Remediator, SaaExecutor};
use bmc_cert_sync::{Credentials, PushError};
use common::{Staging, write_script};
use std::fs;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn credentials() -> Credentials {
    Credentials {
        username: "ADMIN".to_string(),
        password: "hunter2".to_string(),
    }
}

fn artifacts_left(staging: &Staging) -> usize {
    fs::read_dir(staging.path("artifacts")).unwrap().count()
}

fn executor(staging: &Staging, body: &str) -> SaaExecutor {
    let script = staging.path("saa");
    write_script(&script, body);
    fs::create_dir_all(staging.path("artifacts")).unwrap();
    SaaExecutor::new(script).with_artifact_dir(staging.path("artifacts"))
}

#[tokio::test]
async fn test_push_passes_arguments_and_artifact() {
    let staging = Staging::new();
    let log = staging.path("invocation.log");
    let executor = executor(
        &staging,
        &format!(
            "echo \"$@\" > {log}\ncat \"${{10}}\" >> {log}\necho Finished",
            log = log.display()
        ),
    );
    let target = staging.target("exec-args");

    let output = executor
        .push(&target, &credentials(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.stdout.trim(), "Finished");

    let logged = fs::read_to_string(&log).unwrap();
    let mut lines = logged.lines();
    let args = lines.next().unwrap();
    assert!(args.starts_with("-u ADMIN -p hunter2 -c ChangeBmcCfg -i 127.0.0.1 --file "));

    let xml: String = lines.collect::<Vec<_>>().join("\n");
    assert!(xml.contains("<BmcCfg>"));
    assert!(xml.contains(&format!(
        "<CertFile>{}</CertFile>",
        target.cert_path.display()
    )));
    assert!(xml.contains(&format!(
        "<PrivKeyFile>{}</PrivKeyFile>",
        target.key_path.display()
    )));

    assert_eq!(artifacts_left(&staging), 0);
}

#[tokio::test]
async fn test_non_zero_exit_captures_output() {
    let staging = Staging::new();
    let executor = executor(
        &staging,
        "echo 'Login OK'\necho 'Unable to upload certificate' >&2\nexit 3",
    );

    let err = executor
        .push(&staging.target("exec-fail"), &credentials(), &CancellationToken::new())
        .await
        .unwrap_err();

    match &err {
        PushError::Exit {
            status,
            stdout,
            stderr,
            ..
        } => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(stdout.trim(), "Login OK");
            assert_eq!(stderr.trim(), "Unable to upload certificate");
        }
        other => panic!("expected exit error, got {:?}", other),
    }
    assert!(err.to_string().contains("Unable to upload certificate"));
    assert_eq!(artifacts_left(&staging), 0);
}

#[tokio::test]
async fn test_timeout_kills_tool() {
    let staging = Staging::new();
    let executor =
        executor(&staging, "exec sleep 30").with_timeout(Duration::from_millis(200));

    let err = executor
        .push(&staging.target("exec-slow"), &credentials(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PushError::Timeout { .. }));
    assert_eq!(artifacts_left(&staging), 0);
}

#[tokio::test]
async fn test_cancel_interrupts_push() {
    let staging = Staging::new();
    let executor = executor(&staging, "exec sleep 30");
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = executor
        .push(&staging.target("exec-cancel"), &credentials(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PushError::Cancelled { .. }));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(artifacts_left(&staging), 0);
}
