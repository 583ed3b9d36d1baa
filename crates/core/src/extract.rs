//! Token extraction from disassembler and string-dump output.
//!
//! Each mode has a pure line classifier (`&str -> Option<token>`); the
//! extractor just maps it over the lines of a tool's output. Lines that do not
//! match contribute nothing, so headers, section labels and blank lines are
//! skipped silently.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractionMode;

/// `... <name>` or `... <name@version>` at end of line.
pub static RE_SYMBOL_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([_[:alnum:]]+)(?:@[\w.]+)?>\s*$").expect("valid symbol reference regex")
});

/// `  401020:\t48 89 e5\tpush   %rbp` -> `push`
///
/// Mnemonics spelled only with hex letters (`add`, `dec`) are swallowed by the
/// opcode-byte run when the operand starts with an alphanumeric, so
/// `add    0x8(%rax),%edx` yields `0x8`.
pub static RE_MNEMONIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[[:xdigit:]]+:[[:xdigit:]\s]+\s+([[:alnum:]]+)\s*")
        .expect("valid mnemonic regex")
});

/// Symbol name referenced at the end of a disassembly line, without any
/// `@version` suffix.
pub fn symbol_token(line: &str) -> Option<&str> {
    RE_SYMBOL_REF.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Instruction mnemonic of a disassembly line.
pub fn mnemonic_token(line: &str) -> Option<&str> {
    RE_MNEMONIC.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// One `strings` output line with all punctuation removed.
///
/// The cleaned line is kept whole (embedded spaces included). Lines left with
/// nothing but whitespace are dropped.
pub fn string_token(line: &str) -> Option<String> {
    let cleaned: String = line.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Extract the ordered token sequence from a tool's raw output.
pub fn extract_tokens(mode: ExtractionMode, output: &str) -> Vec<String> {
    match mode {
        ExtractionMode::Symbols => {
            output.lines().filter_map(symbol_token).map(str::to_string).collect()
        }
        ExtractionMode::Mnemonics => {
            output.lines().filter_map(mnemonic_token).map(str::to_string).collect()
        }
        ExtractionMode::Strings => output.lines().filter_map(string_token).collect(),
    }
}

/// Join tokens into the single whitespace-separated blob the engine consumes.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}
