use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} not found on PATH (set {env_var} to point at it)")]
    NotFound { tool: String, env_var: String },
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// An external executable resolved once up front and invoked per target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    pub name: String,
    pub program: PathBuf,
}

impl ExternalTool {
    /// Resolve `default_name` on PATH, honoring an override in `env_var`.
    ///
    /// An override containing a path separator must point at an existing file;
    /// a bare name is searched on PATH like the default.
    pub fn resolve(default_name: &str, env_var: &str) -> Result<Self, ToolError> {
        let requested = env::var_os(env_var)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default_name));

        let program = if requested.components().count() > 1 {
            requested.is_file().then(|| requested.clone())
        } else {
            find_in_path(&requested.to_string_lossy())
        };

        match program {
            Some(program) => {
                debug!("resolved {} to {}", default_name, program.display());
                Ok(Self { name: default_name.to_string(), program })
            }
            None => Err(ToolError::NotFound {
                tool: requested.display().to_string(),
                env_var: env_var.to_string(),
            }),
        }
    }

    /// Run the tool and return its stdout as text.
    ///
    /// A non-zero exit status is reported as a warning only; whatever the tool
    /// wrote to stdout is still returned.
    pub fn run<I, S>(&self, args: I) -> Result<String, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command.args(args);
        debug!("running {:?}", command);

        let output = command
            .output()
            .map_err(|source| ToolError::Spawn { tool: self.name.clone(), source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} exited with {}: {}", self.name, output.status, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Locate `executable` in the directories listed in PATH.
pub fn find_in_path(executable: &str) -> Option<PathBuf> {
    let names: Vec<String> = if cfg!(windows) && Path::new(executable).extension().is_none() {
        vec![format!("{executable}.exe"), executable.to_string()]
    } else {
        vec![executable.to_string()]
    };

    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths).find_map(|dir| {
            names.iter().map(|name| dir.join(name)).find(|candidate| candidate.is_file())
        })
    })
}
