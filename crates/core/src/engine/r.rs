use std::env;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::{debug, warn};

use crate::engine::{EngineError, StatsEngine};
use crate::services::find_in_path;

pub const DONE_MARK: &str = "@@WC_DONE@@";
pub const ERROR_MARK: &str = "@@WC_ERR@@";
pub const TRACE_MARK: &str = "@@WC_TRACE@@";

// The calling handler captures the call stack at the point of the error,
// keeping only the frames between the wrapper's `withCallingHandlers` and the
// handler itself, innermost first. R's internal `.handleSimpleError` frame is
// dropped.
const WRAP_HEAD: &str = ".wc_calls <- list(); invisible(tryCatch(withCallingHandlers({ ";
const WRAP_TAIL: &str = concat!(
    r#"; NULL }, error = function(e) { "#,
    r#"calls <- Filter(function(f) !identical(f[[1L]], quote(.handleSimpleError)), sys.calls()); "#,
    r#"top <- which(vapply(calls, function(f) identical(f[[1L]], quote(withCallingHandlers)), logical(1L)))[1L]; "#,
    r#"if (!is.na(top) && length(calls) - top > 1L) .wc_calls <<- rev(calls[seq.int(top + 1L, length(calls) - 1L)]) }), "#,
    r#"error = function(e) { cat('\n@@WC_ERR@@', gsub('[\r\n]+', ' ', conditionMessage(e)), '\n', sep = ''); "#,
    r#"for (frame in .wc_calls) cat('@@WC_TRACE@@', paste(deparse(frame), collapse = ' '), '\n', sep = '') })); "#,
    r#"cat('\n@@WC_DONE@@\n'); flush(stdout())"#,
);

/// Choose the R installation directory: explicit `dir`, then `R_HOME`, then
/// platform detection. The result must exist on disk.
pub fn resolve_r_home(dir: Option<&Path>) -> Result<PathBuf, EngineError> {
    let home = dir
        .map(Path::to_path_buf)
        .or_else(|| env::var_os("R_HOME").filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(detect_r_home)
        .ok_or(EngineError::UnknownHome)?;

    if !home.exists() {
        return Err(EngineError::MissingHome(home.display().to_string()));
    }
    Ok(home)
}

/// Best guess at the system R installation directory.
pub fn detect_r_home() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        Some(PathBuf::from("/Library/Frameworks/R.framework/Resources"))
    } else if cfg!(windows) {
        // probably wrong for most installs, which carry a version directory
        Some(PathBuf::from("C:/Program Files/R"))
    } else if cfg!(target_os = "freebsd") {
        detect_unix_r_home().or_else(|| Some(PathBuf::from("/usr/local/lib/R")))
    } else if cfg!(unix) {
        detect_unix_r_home().or_else(|| Some(PathBuf::from("/usr/lib/R")))
    } else {
        None
    }
}

/// `<prefix>/bin/R` on PATH implies `<prefix>/lib/R`.
fn detect_unix_r_home() -> Option<PathBuf> {
    let r_bin = find_in_path("R")?;
    let r_bin = r_bin.to_string_lossy();
    let prefix = r_bin.split("/bin/R").next()?;
    let home = Path::new(prefix).join("lib").join("R");
    home.exists().then_some(home)
}

fn r_executable(home: &Path) -> Result<PathBuf, EngineError> {
    let bundled = home.join("bin").join(if cfg!(windows) { "R.exe" } else { "R" });
    if bundled.is_file() {
        return Ok(bundled);
    }
    find_in_path("R").ok_or_else(|| EngineError::MissingExecutable(home.display().to_string()))
}

/// Some R graphics subsystems misbehave when driven from a pipe.
fn graphics_fix() -> Option<&'static str> {
    if cfg!(any(target_os = "linux", target_os = "freebsd")) {
        Some("graphics.off(); X11.options(type = 'Xlib')")
    } else if cfg!(target_os = "macos") {
        Some("graphics.off(); X11.options(type = 'nbcairo')")
    } else {
        None
    }
}

/// Quote `value` as a single-quoted R string literal.
pub fn r_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Wrap `expression` so R reports its outcome through marker lines on stdout.
pub fn wrap_expression(expression: &str) -> String {
    let single_line = expression.replace(['\n', '\r'], " ");
    format!("{WRAP_HEAD}{single_line}{WRAP_TAIL}\n")
}

/// A long-lived R session driven over stdin/stdout.
///
/// The session is started once per run and reused for every target. Dropping
/// it closes R's stdin and waits for the process to exit.
pub struct REngine {
    home: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl REngine {
    /// Start R from the resolved installation and apply the graphics workaround.
    pub fn start(r_dir: Option<&Path>) -> Result<Self, EngineError> {
        let home = resolve_r_home(r_dir)?;
        let executable = r_executable(&home)?;
        debug!("starting R at {} (R_HOME={})", executable.display(), home.display());

        let mut child = Command::new(&executable)
            .args(["--no-save", "--no-restore", "--slave"])
            .env("R_HOME", &home)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().ok_or(EngineError::Terminated)?;
        let mut engine = Self { home, child, stdin, stdout: BufReader::new(stdout) };

        if let Some(fix) = graphics_fix() {
            if let Err(err) = engine.evaluate(fix) {
                warn!("R graphics workaround failed: {err}");
            }
        }

        Ok(engine)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    fn read_outcome(&mut self) -> Result<(), EngineError> {
        let mut message = None;
        let mut trace = Vec::new();

        loop {
            let mut buf = String::new();
            if self.stdout.read_line(&mut buf)? == 0 {
                // The session is gone; refuse further expressions.
                self.stdin = None;
                return Err(EngineError::Terminated);
            }
            let line = buf.trim_end_matches(['\r', '\n']);

            if line == DONE_MARK {
                break;
            } else if let Some(msg) = line.strip_prefix(ERROR_MARK) {
                message = Some(msg.trim().to_string());
            } else if let Some(frame) = line.strip_prefix(TRACE_MARK) {
                trace.push(frame.trim_end().to_string());
            } else if !line.is_empty() {
                debug!("R: {line}");
            }
        }

        match message {
            Some(message) => Err(EngineError::Evaluation { message, trace }),
            None => Ok(()),
        }
    }
}

impl StatsEngine for REngine {
    fn load_package(&mut self, name: &str) -> Result<(), EngineError> {
        self.evaluate(&format!("suppressMessages(library({}))", r_string_literal(name)))
    }

    fn evaluate(&mut self, expression: &str) -> Result<(), EngineError> {
        debug!("R> {expression}");
        let stdin = self.stdin.as_mut().ok_or(EngineError::Terminated)?;
        stdin.write_all(wrap_expression(expression).as_bytes())?;
        stdin.flush()?;
        self.read_outcome()
    }

    fn name(&self) -> &'static str {
        "R"
    }
}

impl Drop for REngine {
    fn drop(&mut self) {
        // EOF on stdin ends the session.
        drop(self.stdin.take());
        if let Err(err) = self.child.wait() {
            debug!("failed to reap R session: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_escapes_quotes_and_backslashes() {
        assert_eq!(r_string_literal("plain"), "'plain'");
        assert_eq!(r_string_literal("it's"), r"'it\'s'");
        assert_eq!(r_string_literal(r"C:\out\a.png"), r"'C:\\out\\a.png'");
    }

    #[test]
    fn wrapped_expression_is_one_line_with_markers() {
        let wrapped = wrap_expression("tdm <- TermDocumentMatrix(corpus)\nx <- 1");
        assert_eq!(wrapped.matches('\n').count(), 1);
        assert!(wrapped.ends_with('\n'));
        assert!(wrapped.contains("tdm <- TermDocumentMatrix(corpus) x <- 1"));
        assert!(wrapped.contains(DONE_MARK));
        assert!(wrapped.contains(ERROR_MARK));
        assert!(wrapped.contains(TRACE_MARK));
        assert!(wrapped.starts_with(".wc_calls <- list(); "));
        assert!(wrapped.contains("withCallingHandlers({ tdm <- TermDocumentMatrix(corpus) x <- 1; NULL }"));
        assert!(wrapped.contains("sys.calls()"));
        assert!(wrapped.contains("paste(deparse(frame), collapse = ' ')"));
    }

    #[test]
    fn explicit_home_must_exist() {
        let err = resolve_r_home(Some(Path::new("/definitely/not/an/r/home"))).unwrap_err();
        assert!(matches!(err, EngineError::MissingHome(_)));
    }

    #[test]
    fn explicit_home_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_r_home(Some(dir.path())).unwrap(), dir.path());
    }
}
