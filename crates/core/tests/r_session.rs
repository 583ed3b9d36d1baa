#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use wordcloud_core::engine::REngine;
use wordcloud_core::{EngineError, StatsEngine};

/// Stand-in for `R --slave`: logs each input line and answers with the
/// marker protocol, raising an error with a four-frame trace for any line
/// mentioning `boom`.
const FAKE_R: &str = r#"#!/bin/sh
while IFS= read -r line; do
  printf '%s\n' "$line" >> "$FAKE_R_LOG"
  echo "[1] chatter"
  case "$line" in
    *boom*)
      echo "@@WC_ERR@@object 'boom' not found"
      echo "@@WC_TRACE@@VectorSource(boom)"
      echo "@@WC_TRACE@@Corpus(VectorSource(boom))"
      echo "@@WC_TRACE@@eval(expr, envir, enclos)"
      echo "@@WC_TRACE@@doTryCatch(return(expr), name, parentenv, handler)"
      ;;
  esac
  echo "@@WC_DONE@@"
done
"#;

// One test per file: writing and then exec'ing a script races with forks
// from sibling test threads (ETXTBSY).
#[test]
fn session_speaks_the_marker_protocol() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("rhome");
    fs::create_dir_all(home.join("bin")).unwrap();
    let script = home.join("bin").join("R");
    fs::write(&script, FAKE_R).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let log = temp.path().join("r.log");
    std::env::set_var("FAKE_R_LOG", &log);

    let mut engine = REngine::start(Some(&home)).expect("start fake R");
    assert_eq!(engine.home(), home.as_path());

    engine.load_package("tm").unwrap();
    engine.evaluate("tdm <- TermDocumentMatrix(corpus)").unwrap();

    let err = engine.evaluate("corpus <- Corpus(VectorSource(boom))").unwrap_err();
    match &err {
        EngineError::Evaluation { message, trace } => {
            assert_eq!(message, "object 'boom' not found");
            assert_eq!(trace.len(), 4);
            assert_eq!(trace[0], "VectorSource(boom)");
            assert_eq!(trace[3], "doTryCatch(return(expr), name, parentenv, handler)");
        }
        other => panic!("unexpected error {other:?}"),
    }

    // the session survives an evaluation error
    engine.evaluate("x <- 1").unwrap();
    drop(engine);

    let sent = fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = sent.lines().collect();
    assert!(lines.iter().all(|l| l.starts_with(".wc_calls <- list(); invisible(tryCatch(withCallingHandlers({ ")));
    assert!(lines.iter().any(|l| l.contains("suppressMessages(library('tm'))")));
    assert!(lines.iter().any(|l| l.contains("x <- 1")));
}
