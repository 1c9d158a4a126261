use crate::report::build_job::{BuildJob, CONTAINER_WORKDIR};
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub const DEFAULT_CONTAINER_BINARY: &str = "docker";
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(600);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStatus {
    Disabled,
    Completed,
    Failed { exit_code: Option<i32> },
    LaunchFailed { reason: String },
    TimedOut { timeout_ms: u64 },
}

impl RenderStatus {
    pub fn describe(&self) -> String {
        match self {
            Self::Disabled => "disabled".to_string(),
            Self::Completed => "completed".to_string(),
            Self::Failed {
                exit_code: Some(code),
            } => format!("failed exit_code={code}"),
            Self::Failed { exit_code: None } => "failed exit_code=none".to_string(),
            Self::LaunchFailed { reason } => format!("launch_failed reason={reason}"),
            Self::TimedOut { timeout_ms } => format!("timed_out timeout_ms={timeout_ms}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub succeeded: bool,
    pub logs: String,
    pub status: RenderStatus,
    pub command_form: String,
}

impl RenderResult {
    fn disabled() -> Self {
        Self {
            succeeded: true,
            logs: String::new(),
            status: RenderStatus::Disabled,
            command_form: String::new(),
        }
    }

    fn failed(status: RenderStatus, logs: String, command_form: String) -> Self {
        Self {
            succeeded: false,
            logs,
            status,
            command_form,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContainerRenderer {
    pub binary: String,
    pub image: Option<String>,
    pub timeout: Duration,
}

impl ContainerRenderer {
    pub fn new(binary: impl Into<String>, image: Option<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            image: image.filter(|image| !image.trim().is_empty()),
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self::new(DEFAULT_CONTAINER_BINARY, None, DEFAULT_RENDER_TIMEOUT)
    }

    pub fn is_enabled(&self) -> bool {
        self.image.is_some()
    }

    pub fn container_args(
        &self,
        image: &str,
        job: &BuildJob,
        mount_source: &Path,
        container_name: &str,
    ) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            container_name.to_string(),
            "-v".to_string(),
            format!("{}:{CONTAINER_WORKDIR}:rw", mount_source.display()),
            image.to_string(),
            "bash".to_string(),
            "-c".to_string(),
            job.shell_script(),
        ]
    }

    pub fn run(&self, job: &BuildJob, mount_source: &Path) -> RenderResult {
        let Some(image) = self.image.as_deref() else {
            return RenderResult::disabled();
        };

        let mount_source = match fs::canonicalize(mount_source) {
            Ok(path) => path,
            Err(err) => {
                return RenderResult::failed(
                    RenderStatus::LaunchFailed {
                        reason: format!(
                            "failed to resolve mount source {}: {err}",
                            mount_source.display()
                        ),
                    },
                    String::new(),
                    String::new(),
                )
            }
        };

        let container_name = unique_container_name();
        let args = self.container_args(image, job, &mount_source, &container_name);
        let command_form = format!("{} {}", self.binary, args.join(" "));

        let mut child = match Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                let reason = if err.kind() == std::io::ErrorKind::NotFound {
                    format!("container binary `{}` not found", self.binary)
                } else {
                    format!("failed to launch `{}`: {err}", self.binary)
                };
                return RenderResult::failed(
                    RenderStatus::LaunchFailed { reason },
                    String::new(),
                    command_form,
                );
            }
        };

        let stdout_reader = child.stdout.take().map(|stdout| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = BufReader::new(stdout).read_to_string(&mut buf);
                buf
            })
        });
        let stderr_reader = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = BufReader::new(stderr).read_to_string(&mut buf);
                buf
            })
        });
        let collect_logs = |stdout: Option<thread::JoinHandle<String>>,
                            stderr: Option<thread::JoinHandle<String>>| {
            let mut logs = stdout
                .and_then(|handle| handle.join().ok())
                .unwrap_or_default();
            logs.push_str(
                &stderr
                    .and_then(|handle| handle.join().ok())
                    .unwrap_or_default(),
            );
            logs
        };

        let start = Instant::now();
        let exit_status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        let teardown = self.remove_container(&container_name);
                        let mut logs = collect_logs(stdout_reader, stderr_reader);
                        logs.push_str(&teardown);
                        return RenderResult::failed(
                            RenderStatus::TimedOut {
                                timeout_ms: self.timeout.as_millis() as u64,
                            },
                            logs,
                            command_form,
                        );
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let teardown = self.remove_container(&container_name);
                    let mut logs = collect_logs(stdout_reader, stderr_reader);
                    logs.push_str(&teardown);
                    return RenderResult::failed(
                        RenderStatus::LaunchFailed {
                            reason: format!("failed to wait for `{}`: {err}", self.binary),
                        },
                        logs,
                        command_form,
                    );
                }
            }
        };

        let logs = collect_logs(stdout_reader, stderr_reader);
        if exit_status.success() {
            RenderResult {
                succeeded: true,
                logs,
                status: RenderStatus::Completed,
                command_form,
            }
        } else {
            RenderResult::failed(
                RenderStatus::Failed {
                    exit_code: exit_status.code(),
                },
                logs,
                command_form,
            )
        }
    }

    fn remove_container(&self, container_name: &str) -> String {
        match Command::new(&self.binary)
            .args(["rm", "-f", container_name])
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            ),
            Err(err) => format!("failed to remove container {container_name}: {err}\n"),
        }
    }
}

fn unique_container_name() -> String {
    let mut bytes = [0_u8; 6];
    let suffix = match getrandom::getrandom(&mut bytes) {
        Ok(()) => bytes.iter().map(|b| format!("{b:02x}")).collect::<String>(),
        Err(_) => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
            .to_string(),
    };
    format!("quarto-render-{}-{suffix}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::build_job::{compose, ExtraPackages};
    use crate::report::slot::OutputSlot;
    use std::path::PathBuf;

    #[test]
    fn container_args_mount_the_slot_and_pass_script_as_one_argument() {
        let slot = OutputSlot {
            base_name: "r".to_string(),
            collision_index: 0,
            directory_path: PathBuf::from("/out/r"),
        };
        let job = compose(&slot, "r.qmd", &ExtraPackages::default());
        let renderer = ContainerRenderer::new(
            "docker",
            Some("quarto:latest".to_string()),
            DEFAULT_RENDER_TIMEOUT,
        );
        let args = renderer.container_args("quarto:latest", &job, Path::new("/out/r"), "name-1");
        assert_eq!(
            args,
            [
                "run",
                "--rm",
                "--name",
                "name-1",
                "-v",
                "/out/r:/home/quarto:rw",
                "quarto:latest",
                "bash",
                "-c",
                "cd /home/quarto; quarto render r.qmd",
            ]
        );
    }

    #[test]
    fn blank_image_disables_rendering() {
        let renderer =
            ContainerRenderer::new("docker", Some("  ".to_string()), DEFAULT_RENDER_TIMEOUT);
        assert!(!renderer.is_enabled());
    }

    #[test]
    fn container_names_are_unique() {
        assert_ne!(unique_container_name(), unique_container_name());
    }
}
