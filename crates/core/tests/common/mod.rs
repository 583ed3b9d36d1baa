#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use wordcloud_core::services::{TokenSource, ToolError};
use wordcloud_core::{EngineError, StatsEngine};

/// Engine double that records every expression and fails on a marker.
#[derive(Default)]
pub struct RecordingEngine {
    pub packages: Vec<String>,
    pub expressions: Vec<String>,
    pub fail_when_contains: Option<String>,
}

impl RecordingEngine {
    pub fn failing_on(marker: &str) -> Self {
        Self { fail_when_contains: Some(marker.to_string()), ..Self::default() }
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.expressions.iter().position(|e| e.contains(needle))
    }
}

impl StatsEngine for RecordingEngine {
    fn load_package(&mut self, name: &str) -> Result<(), EngineError> {
        self.packages.push(name.to_string());
        Ok(())
    }

    fn evaluate(&mut self, expression: &str) -> Result<(), EngineError> {
        self.expressions.push(expression.to_string());
        match &self.fail_when_contains {
            Some(marker) if expression.contains(marker.as_str()) => Err(EngineError::Evaluation {
                message: format!("object '{marker}' not found"),
                trace: vec!["frame 1".into(), "frame 2".into(), "frame 3".into(), "frame 4".into()],
            }),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Token source backed by a fixed map of target -> tokens.
#[derive(Default)]
pub struct MapSource {
    pub tokens: HashMap<PathBuf, Vec<String>>,
}

impl MapSource {
    pub fn with(mut self, target: &str, tokens: &[&str]) -> Self {
        self.tokens.insert(PathBuf::from(target), tokens.iter().map(|t| t.to_string()).collect());
        self
    }
}

impl TokenSource for MapSource {
    fn tokens(&self, target: &Path) -> Result<Vec<String>, ToolError> {
        self.tokens.get(target).cloned().ok_or_else(|| ToolError::Spawn {
            tool: "map".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "no such target"),
        })
    }

    fn name(&self) -> &'static str {
        "map"
    }
}
