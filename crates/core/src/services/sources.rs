use std::path::Path;

use crate::config::ExtractionMode;
use crate::extract::extract_tokens;
use crate::services::tools::{ExternalTool, ToolError};

/// Flags handed to objdump: all sections, dynamic relocs, dynamic and regular
/// symbol tables, demangling, full contents, raw data.
pub const OBJDUMP_FLAGS: &str = "-DRTgrstx";

/// Produces the token sequence for one target.
pub trait TokenSource {
    fn tokens(&self, target: &Path) -> Result<Vec<String>, ToolError>;
    fn name(&self) -> &'static str;
}

/// Tokens taken from `objdump -DRTgrstx` output (symbols or mnemonics).
pub struct DisassemblySource {
    pub tool: ExternalTool,
    pub mode: ExtractionMode,
}

impl DisassemblySource {
    pub fn resolve(mode: ExtractionMode) -> Result<Self, ToolError> {
        Ok(Self { tool: ExternalTool::resolve("objdump", "OBJDUMP")?, mode })
    }
}

impl TokenSource for DisassemblySource {
    fn tokens(&self, target: &Path) -> Result<Vec<String>, ToolError> {
        let listing = self.tool.run([Path::new(OBJDUMP_FLAGS), target])?;
        Ok(extract_tokens(self.mode, &listing))
    }

    fn name(&self) -> &'static str {
        match self.mode {
            ExtractionMode::Mnemonics => "objdump-mnemonics",
            _ => "objdump-symbols",
        }
    }
}

/// Tokens taken from `strings` output, one per cleaned line.
pub struct StringDumpSource {
    pub tool: ExternalTool,
}

impl StringDumpSource {
    pub fn resolve() -> Result<Self, ToolError> {
        Ok(Self { tool: ExternalTool::resolve("strings", "STRINGS")? })
    }
}

impl TokenSource for StringDumpSource {
    fn tokens(&self, target: &Path) -> Result<Vec<String>, ToolError> {
        let dump = self.tool.run([target])?;
        Ok(extract_tokens(ExtractionMode::Strings, &dump))
    }

    fn name(&self) -> &'static str {
        "strings"
    }
}

/// Resolve the token source for `mode`, failing if its tool cannot be found.
pub fn source_for_mode(mode: ExtractionMode) -> Result<Box<dyn TokenSource>, ToolError> {
    Ok(match mode {
        ExtractionMode::Strings => Box::new(StringDumpSource::resolve()?),
        ExtractionMode::Symbols | ExtractionMode::Mnemonics => {
            Box::new(DisassemblySource::resolve(mode)?)
        }
    })
}
