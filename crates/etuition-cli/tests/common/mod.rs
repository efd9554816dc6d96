use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An isolated HOME with its own session storage.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where `directories` puts the session file on Linux.
    #[allow(dead_code)]
    pub fn session_file(&self) -> PathBuf {
        self.path().join("data").join("etuition").join("session.json")
    }

    /// Run the CLI binary against `api`.
    pub async fn run(&self, args: &[&str], api: &str) -> Output {
        let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_etuition"));
        cmd.args(args);
        cmd.env("HOME", self.path());
        cmd.env("XDG_DATA_HOME", self.path().join("data"));
        cmd.env("ETUITION_API_URL", api);
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("ETUITION_TOKEN");
        cmd.env_remove("RUST_LOG");
        cmd.output().await.expect("Failed to execute CLI")
    }

    /// Run the CLI and expect success, returning stdout.
    pub async fn run_success(&self, args: &[&str], api: &str) -> String {
        let output = self.run(args, api).await;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Store a session for `email`/`token`, answering the role lookup with `role`.
    pub async fn login(&self, server: &MockServer, email: &str, token: &str, role: &str) {
        mount_role(server, email, token, role).await;
        let out = self
            .run_success(
                &["session", "login", "--email", email, "--name", "Ada", "--token", token],
                &server.uri(),
            )
            .await;
        assert!(out.contains(role), "unexpected login output: {out}");
    }
}

/// Answer `GET /users/{email}` for `token` with `role`.
pub async fn mount_role(server: &MockServer, email: &str, token: &str, role: &str) {
    let encoded = email.replace('@', "%40");
    Mock::given(method("GET"))
        .and(path(format!("/users/{encoded}")))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "email": email, "role": role
        })))
        .mount(server)
        .await;
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
