use crate::core::paths::TYPER_ARTIFACT;
use crate::tools::traits::{Typer, TypingRequest};
use crate::SeqtyperError;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// Interval between exit checks while waiting on the typer
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lines of stderr kept in error messages
const STDERR_TAIL_LINES: usize = 20;

/// Drain a child stream on its own thread so the pipe never fills up
fn capture_stream<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

/// Kill the child and, on Unix, every process in its group. The typer
/// starts its aligners as children of its own, and those inherit the
/// output pipes.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = i32::try_from(child.id()) {
            // SAFETY: plain signal delivery to the group we created at spawn
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
    child.kill().ok();
    let _ = child.wait();
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// CGE MLST typer run as an external program
#[derive(Debug, Clone)]
pub struct MlstTyper {
    program: PathBuf,
    resolved: bool,
}

impl MlstTyper {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        let program = program.into();
        let resolved = program.is_file();
        Self { program, resolved }
    }

    /// Resolve a program name or path.
    ///
    /// Bare names are looked up on PATH. An unresolvable program is kept
    /// as given; every invocation then fails and is reported per record.
    pub fn locate(program: &str) -> Self {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 || candidate.is_file() {
            return Self::new(candidate);
        }
        match which::which(program) {
            Ok(path) => {
                debug!("Using typer at {}", path.display());
                Self {
                    program: path,
                    resolved: true,
                }
            }
            Err(e) => {
                warn!("Typer program {} not found on PATH: {}", program, e);
                Self {
                    program: candidate.to_path_buf(),
                    resolved: false,
                }
            }
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Argument vector for one invocation
    pub fn arguments(request: &TypingRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            request.fasta.into(),
            "-s".into(),
            request.species.into(),
            "-p".into(),
            request.database.into(),
            "-t".into(),
            request.output_dir.into(),
            "-o".into(),
            request.output_dir.into(),
            "-d".into(),
            request.flags.depth.to_string().into(),
        ];
        if let Some(method_path) = request.method_path {
            args.push("-mp".into());
            args.push(method_path.into());
        }
        if request.flags.extended_output {
            args.push("-x".into());
        }
        if request.flags.quiet {
            args.push("-q".into());
        }
        if request.flags.matrix {
            args.push("-matrix".into());
        }
        args
    }

    fn wait(
        &self,
        child: &mut Child,
        timeout: Option<Duration>,
    ) -> Result<ExitStatus, SeqtyperError> {
        let Some(timeout) = timeout else {
            return child.wait().map_err(|e| {
                SeqtyperError::TyperInvocation(format!("failed to wait for typer: {}", e))
            });
        };

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if start.elapsed() > timeout {
                        warn!(
                            "Typer exceeded {}s, killing process {}",
                            timeout.as_secs(),
                            child.id()
                        );
                        kill_tree(child);
                        return Err(SeqtyperError::Timeout {
                            seconds: timeout.as_secs(),
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(SeqtyperError::TyperInvocation(format!(
                        "failed to check typer status: {}",
                        e
                    )))
                }
            }
        }
    }
}

impl Typer for MlstTyper {
    fn type_sequence(&self, request: &TypingRequest<'_>) -> Result<PathBuf, SeqtyperError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::arguments(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        cmd.process_group(0);
        debug!("Running typer: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            SeqtyperError::TyperInvocation(format!(
                "failed to start {}: {}",
                self.program.display(),
                e
            ))
        })?;

        let stdout = child.stdout.take().map(capture_stream);
        let stderr = child.stderr.take().map(capture_stream);

        let waited = self.wait(&mut child, request.timeout);

        // A process outside the group may still hold the pipes after a
        // kill; leave its readers detached instead of joining them.
        if let Err(e @ SeqtyperError::Timeout { .. }) = waited {
            return Err(e);
        }

        let stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
        if !stdout.trim().is_empty() {
            debug!("typer stdout:\n{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            debug!("typer stderr:\n{}", stderr.trim_end());
        }

        let status = waited?;
        let artifact = request.output_dir.join(TYPER_ARTIFACT);

        if !status.success() {
            if artifact.is_file() {
                warn!(
                    "Typer exited with {} but wrote {}; using it",
                    status,
                    artifact.display()
                );
                return Ok(artifact);
            }
            let mut message = format!("{} exited with {}", self.program.display(), status);
            let stderr_tail = tail(&stderr, STDERR_TAIL_LINES);
            if !stderr_tail.is_empty() {
                message.push_str(": ");
                message.push_str(&stderr_tail);
            }
            return Err(SeqtyperError::TyperInvocation(message));
        }

        Ok(artifact)
    }

    fn name(&self) -> &str {
        "mlst"
    }

    fn is_available(&self) -> bool {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TyperFlags;

    fn request<'a>(flags: &'a TyperFlags, method_path: Option<&'a Path>) -> TypingRequest<'a> {
        TypingRequest {
            fasta: Path::new("/scratch/sequence.fasta"),
            species: "hpylori",
            database: Path::new("/db/mlst_db"),
            output_dir: Path::new("/scratch"),
            method_path,
            flags,
            timeout: None,
        }
    }

    #[test]
    fn test_arguments_default_flags() {
        let flags = TyperFlags::default();
        let args = MlstTyper::arguments(&request(&flags, None));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-i", "/scratch/sequence.fasta", "-s", "hpylori", "-p", "/db/mlst_db",
                "-t", "/scratch", "-o", "/scratch", "-d", "5", "-q",
            ]
        );
    }

    #[test]
    fn test_arguments_all_flags() {
        let flags = TyperFlags {
            depth: 7.5,
            matrix: true,
            extended_output: true,
            quiet: false,
        };
        let blastn = Path::new("/opt/blast/bin/blastn");
        let args = MlstTyper::arguments(&request(&flags, Some(blastn)));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert!(args.windows(2).any(|w| w[0] == "-mp" && w[1] == "/opt/blast/bin/blastn"));
        assert!(args.windows(2).any(|w| w[0] == "-d" && w[1] == "7.5"));
        assert!(args.contains(&"-x".to_string()));
        assert!(args.contains(&"-matrix".to_string()));
        assert!(!args.contains(&"-q".to_string()));
    }

    #[test]
    fn test_missing_program_is_invocation_error() {
        let typer = MlstTyper::locate("seqtyper-no-such-typer-binary");
        assert!(!typer.is_available());

        let dir = tempfile::TempDir::new().unwrap();
        let flags = TyperFlags::default();
        let req = TypingRequest {
            output_dir: dir.path(),
            ..request(&flags, None)
        };
        assert!(matches!(
            typer.type_sequence(&req),
            Err(SeqtyperError::TyperInvocation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_typer_and_its_children() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("slow_mlst.sh");
        // sleep runs as a child of the shell and holds stdout/stderr open
        std::fs::write(&script, "#!/bin/sh\nsleep 8\necho done\n").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let typer = MlstTyper::new(&script);
        let flags = TyperFlags::default();
        let req = TypingRequest {
            output_dir: dir.path(),
            timeout: Some(Duration::from_secs(1)),
            ..request(&flags, None)
        };

        let start = Instant::now();
        let result = typer.type_sequence(&req);
        let elapsed = start.elapsed();

        assert!(matches!(result, Err(SeqtyperError::Timeout { seconds: 1 })), "{:?}", result);
        assert!(elapsed < Duration::from_secs(4), "took {:?}", elapsed);
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\nd", 2), "c\nd");
        assert_eq!(tail("only", 5), "only");
        assert_eq!(tail("", 3), "");
    }
}
