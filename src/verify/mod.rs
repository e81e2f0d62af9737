//! Post-sync verification
//!
//! Collects the build units of the written tree and runs an external tool on
//! each: `dotnet build` for every solution and `python -m compileall` for every
//! Python package root. Each invocation becomes one [`VerifyResult`]; a tool
//! that is missing, fails or times out never stops the others.

use crate::config::VerifyOptions;
use crate::planner::SyncPlan;
use crate::types::{RerootError, VerifyResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::runtime::Builder;
use tracing::debug;

/// One external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCommand {
    /// Display name, e.g. `dotnet build App.sln`
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// Runs verification commands
pub trait VerificationRunner {
    fn run(&self, command: &VerifyCommand) -> VerifyResult;
}

/// Spawns real processes, each bounded by a timeout
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_options(options: &VerifyOptions) -> Self {
        Self::new(Duration::from_secs(options.timeout_secs))
    }

    fn spawn_and_wait(&self, command: &VerifyCommand) -> Result<(bool, String), RerootError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RerootError::Io)?;

        runtime.block_on(async {
            let child = tokio::process::Command::new(&command.program)
                .args(&command.args)
                .current_dir(&command.cwd)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    RerootError::Verification(format!("failed to start {}: {}", command.program, e))
                })?;

            let output = tokio::time::timeout(self.timeout, child.wait_with_output())
                .await
                .map_err(|_| {
                    RerootError::Verification(format!(
                        "{} timed out after {}s",
                        command.name,
                        self.timeout.as_secs()
                    ))
                })??;

            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let combined = [stdout.trim(), stderr.trim()]
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");

            Ok::<_, RerootError>((output.status.success(), combined))
        })
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::from_options(&VerifyOptions::default())
    }
}

impl VerificationRunner for ProcessRunner {
    fn run(&self, command: &VerifyCommand) -> VerifyResult {
        debug!("verify: {} {:?} in {}", command.program, command.args, command.cwd.display());
        match self.spawn_and_wait(command) {
            Ok((ok, output)) => VerifyResult {
                name: command.name.clone(),
                ok,
                output,
            },
            Err(err) => VerifyResult::failed(&command.name, err.to_string()),
        }
    }
}

/// Topmost directory reached by walking up from `path`'s parent while the
/// directory holds an `__init__.py`, stopping at `output_root`.
///
/// A module outside any package yields its own directory; a module inside
/// `pkg/sub/` (both packages) yields the directory containing `pkg`.
pub fn find_python_root(path: &Path, output_root: &Path) -> PathBuf {
    let mut current = path.parent().unwrap_or(output_root).to_path_buf();
    while current != output_root && current.join("__init__.py").exists() {
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    current
}

/// Build units for the targets of `plan` under `output_root`.
pub fn plan_verification(
    plan: &SyncPlan,
    output_root: &Path,
    options: &VerifyOptions,
) -> Vec<VerifyCommand> {
    let mut commands = Vec::new();

    if options.dotnet_build {
        for action in &plan.actions {
            if action.target_extension() != ".sln" {
                continue;
            }
            let sln = &action.target_abs;
            let file_name = sln
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            commands.push(VerifyCommand {
                name: format!("dotnet build {file_name}"),
                program: options.dotnet_command.clone(),
                args: vec!["build".to_string(), sln.display().to_string()],
                cwd: sln.parent().unwrap_or(output_root).to_path_buf(),
            });
        }
    }

    if options.python_compileall {
        let roots: BTreeSet<PathBuf> = plan
            .actions
            .iter()
            .filter(|action| action.target_extension() == ".py")
            .map(|action| find_python_root(&action.target_abs, output_root))
            .collect();

        for root in roots {
            let display = root
                .strip_prefix(output_root)
                .map(|rel| {
                    let rel = rel.to_string_lossy().replace('\\', "/");
                    if rel.is_empty() {
                        ".".to_string()
                    } else {
                        rel
                    }
                })
                .unwrap_or_else(|_| root.display().to_string());
            commands.push(VerifyCommand {
                name: format!("python compileall {display}"),
                program: options.python_command.clone(),
                args: vec![
                    "-m".to_string(),
                    "compileall".to_string(),
                    root.display().to_string(),
                ],
                cwd: output_root.to_path_buf(),
            });
        }
    }

    commands
}

/// Run every command in order, collecting one result each.
pub fn run_verification(
    commands: &[VerifyCommand],
    runner: &dyn VerificationRunner,
) -> Vec<VerifyResult> {
    commands.iter().map(|command| runner.run(command)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::planner::build_sync_plan;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_python_root_walks_packages() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        write(root, "app/pkg/__init__.py", "");
        write(root, "app/pkg/sub/__init__.py", "");
        write(root, "app/pkg/sub/mod.py", "x = 1");
        write(root, "scripts/run.py", "print(1)");

        assert_eq!(
            find_python_root(&root.join("app/pkg/sub/mod.py"), root),
            root.join("app")
        );
        assert_eq!(
            find_python_root(&root.join("scripts/run.py"), root),
            root.join("scripts")
        );
    }

    #[test]
    fn test_find_python_root_stops_at_output_root() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path();
        write(root, "__init__.py", "");
        write(root, "pkg/__init__.py", "");
        write(root, "pkg/a.py", "");

        assert_eq!(find_python_root(&root.join("pkg/a.py"), root), root.to_path_buf());
    }

    #[test]
    fn test_plan_verification_units() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "App.sln", "");
        write(&src, "tools/build.py", "");
        write(&src, "lib/pkg/__init__.py", "");
        write(&src, "lib/pkg/core.py", "");
        fs::create_dir_all(&dst).unwrap();
        // package markers must exist in the written tree
        write(&dst, "lib/pkg/__init__.py", "");

        let plan = build_sync_plan(&src, &dst, &AppConfig::default(), false).unwrap();
        let commands = plan_verification(&plan, &plan.target_root, &VerifyOptions::default());
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["dotnet build App.sln", "python compileall lib", "python compileall tools"]
        );
        assert_eq!(commands[0].cwd, plan.target_root);
        assert_eq!(commands[0].args[0], "build");
        assert_eq!(commands[1].args[..2], ["-m".to_string(), "compileall".to_string()]);
    }

    #[test]
    fn test_plan_verification_respects_toggles() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let src = temp.path().join("src");
        write(&src, "App.sln", "");
        write(&src, "a.py", "");

        let plan = build_sync_plan(&src, &temp.path().join("dst"), &AppConfig::default(), false)
            .unwrap();
        let options = VerifyOptions {
            dotnet_build: false,
            ..VerifyOptions::default()
        };
        let commands = plan_verification(&plan, &plan.target_root, &options);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "python compileall .");
    }

    #[test]
    fn test_missing_tool_is_a_failed_result() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let command = VerifyCommand {
            name: "dotnet build App.sln".to_string(),
            program: "rerooter-no-such-tool".to_string(),
            args: vec!["build".to_string()],
            cwd: temp.path().to_path_buf(),
        };

        let results = run_verification(&[command], &ProcessRunner::default());
        assert_eq!(results.len(), 1);
        assert!(!results[0].ok);
        assert!(results[0].output.contains("failed to start rerooter-no-such-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_captures_output_and_status() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let runner = ProcessRunner::new(Duration::from_secs(30));
        let command = |script: &str| VerifyCommand {
            name: "sh".to_string(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: temp.path().to_path_buf(),
        };

        let ok = runner.run(&command("echo out; echo err 1>&2"));
        assert!(ok.ok);
        assert_eq!(ok.output, "out\nerr");

        let failed = runner.run(&command("exit 3"));
        assert!(!failed.ok);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_times_out() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let runner = ProcessRunner::new(Duration::from_millis(200));
        let result = runner.run(&VerifyCommand {
            name: "slow".to_string(),
            program: "sleep".to_string(),
            args: vec!["5".to_string()],
            cwd: temp.path().to_path_buf(),
        });
        assert!(!result.ok);
        assert!(result.output.contains("timed out"));
    }
}
