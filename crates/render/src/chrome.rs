use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const EXECUTABLES: [&str; 5] = ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"];
/// Installs that aren't normally on `PATH`.
const INSTALL_PATHS: [&str; 3] = [
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
];

/// Represents a Chrome/Chromium executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Chrome {
    /// A directly executable binary.
    Binary { path: PathBuf },
    /// A Flatpak-installed application.
    Flatpak { app_id: String },
}
impl Chrome {
    pub(crate) fn discover() -> Result<Self> {
        for exe in EXECUTABLES {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(chrome = %path.display(), "Discovered Chrome executable");
                return Ok(Self::Binary { path });
            }
        }
        if let Some(path) = INSTALL_PATHS.iter().map(PathBuf::from).find(|p| p.is_file()) {
            tracing::debug!(chrome = %path.display(), "Discovered Chrome installation");
            return Ok(Self::Binary { path });
        }
        tracing::info!("Chrome executable not found in PATH");
        if let Ok(flatpak) = which::which("flatpak") {
            tracing::trace!(flatpak = %flatpak.display(), "Discovered Flatpak on system; searching installed apps");
            // Check Flatpak installations
            let flatpak_apps = ["com.google.Chrome", "org.chromium.Chromium"];
            for app_id in flatpak_apps {
                if Command::new(&flatpak).args(["info", app_id]).output().is_ok_and(|o| o.status.success()) {
                    return Ok(Self::Flatpak { app_id: app_id.to_string() });
                }
            }
        } else {
            tracing::info!("Flatpak not found; skipping containerized Chrome checks.");
        }
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    /// Uses an explicitly configured binary, resolving bare names via `PATH`.
    pub(crate) fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.is_file() {
            return Ok(Self::Binary { path });
        }
        match which::which(&path) {
            Ok(path) => Ok(Self::Binary { path }),
            Err(_) => exn::bail!(ErrorKind::ChromeNotFound),
        }
    }

    fn command(&self) -> Command {
        match self {
            Self::Binary { path } => Command::new(path),
            Self::Flatpak { app_id } => {
                let mut command = Command::new("flatpak");
                command.args(["run", app_id.as_str()]);
                command
            },
        }
    }

    /// Runs Chrome with `args`, returning its stdout.
    ///
    /// Chrome is killed once `timeout` elapses. Both pipes are drained on
    /// helper threads so a large `--dump-dom` can't fill the pipe buffer and
    /// stall the child while we wait on it.
    pub(crate) fn execute(&self, args: &[String], timeout: Duration) -> Result<Vec<u8>> {
        let mut command = self.command();
        command.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        tracing::trace!(?command, "Spawning Chrome");
        let mut child = command.spawn().or_raise(|| ErrorKind::Io)?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait().or_raise(|| ErrorKind::Io)? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(timeout_secs = timeout.as_secs(), "Chrome timed out and was killed");
                exn::bail!(ErrorKind::ChromeTimeout);
            }
            thread::sleep(POLL_INTERVAL);
        };
        let stdout = stdout.map(collect).unwrap_or_default();
        let stderr = stderr.map(collect).unwrap_or_default();
        if !status.success() {
            tracing::debug!(stderr = %String::from_utf8_lossy(&stderr), "Chrome reported an error");
            exn::bail!(ErrorKind::ChromeFailed(status.code().unwrap_or(-1)));
        }
        Ok(stdout)
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = reader.read_to_end(&mut buffer);
        buffer
    })
}

fn collect(handle: JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell() -> Chrome {
        Chrome::at("sh").unwrap()
    }

    fn script(body: &str) -> Vec<String> {
        vec!["-c".to_string(), body.to_string()]
    }

    #[test]
    fn captures_stdout() {
        let out = shell().execute(&script("printf '<html></html>'"), Duration::from_secs(5)).unwrap();
        assert_eq!(out, b"<html></html>");
    }

    #[test]
    fn drains_large_output() {
        // Well past a typical 64KiB pipe buffer.
        let out = shell().execute(&script("head -c 1048576 /dev/zero"), Duration::from_secs(10)).unwrap();
        assert_eq!(out.len(), 1_048_576);
    }

    #[test]
    fn non_zero_exit_is_reported() {
        let err = shell().execute(&script("exit 3"), Duration::from_secs(5)).unwrap_err();
        assert_eq!(*err, ErrorKind::ChromeFailed(3));
    }

    #[test]
    fn slow_process_times_out() {
        let err = shell().execute(&script("sleep 5"), Duration::from_millis(200)).unwrap_err();
        assert_eq!(*err, ErrorKind::ChromeTimeout);
    }

    #[test]
    fn missing_binary_is_not_found() {
        let err = Chrome::at("/definitely/not/a/chrome").unwrap_err();
        assert_eq!(*err, ErrorKind::ChromeNotFound);
    }
}
