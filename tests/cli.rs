#![cfg(unix)]

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[test]
fn sigint_stops_a_run_with_a_duration_limit() {
    let config = std::env::temp_dir().join(format!("generatorbeat-cli-{}.yml", uuid::Uuid::new_v4()));
    std::fs::write(&config, "generatorbeat:\n  generators:\n    filebeat:\n      worker: 2\n")
        .expect("write config");

    let mut child = Command::new(env!("CARGO_BIN_EXE_generatorbeat"))
        .arg("--config")
        .arg(&config)
        .args(["--output", "discard", "--duration", "600", "--stats-interval", "0"])
        .env("RUST_LOG", "info")
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn generatorbeat");

    // Drain stderr until exit so the child never blocks on a full pipe
    let stderr = child.stderr.take().expect("stderr");
    let (running_tx, running_rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            if line.contains("generatorbeat is running") {
                let _ = running_tx.send(());
            }
        }
    });
    running_rx
        .recv_timeout(Duration::from_secs(30))
        .expect("workers started");
    std::thread::sleep(Duration::from_millis(200));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("send SIGINT");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let exit = loop {
        if let Some(exit) = child.try_wait().expect("wait") {
            break exit;
        }
        if Instant::now() > deadline {
            child.kill().ok();
            panic!("generatorbeat ignored SIGINT while --duration was set");
        }
        std::thread::sleep(Duration::from_millis(50));
    };
    std::fs::remove_file(&config).ok();
    assert!(exit.success(), "exit status {exit}");
}
