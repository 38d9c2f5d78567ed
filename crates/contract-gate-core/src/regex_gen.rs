// crates/contract-gate-core/src/regex_gen.rs
// ============================================================================
// Module: Contract Gate Regex Synthesis
// Description: Generates strings that fully match a regex constraint.
// Purpose: Give regex-constrained strings conforming generated values.
// Dependencies: rand, regex-syntax
// ============================================================================

//! ## Overview
//! The regex is parsed into its high-level syntax tree and walked once,
//! choosing a branch for each alternation, a count for each repetition, and a
//! character for each class. Classes prefer ASCII alphanumerics so generated
//! values stay readable in reports; unbounded repetitions are capped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use rand::rngs::StdRng;
use regex_syntax::hir::Class;
use regex_syntax::hir::Hir;
use regex_syntax::hir::HirKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Extra repetitions allowed beyond a repetition's minimum.
const MAX_EXTRA_REPEAT: u32 = 4;

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Generates a string matching `source` in full.
///
/// # Errors
///
/// Returns a diagnostic when the regex does not parse or the synthesized
/// bytes are not UTF-8.
pub fn generate_matching(source: &str, rng: &mut StdRng) -> Result<String, String> {
    let hir = regex_syntax::Parser::new().parse(source).map_err(|err| err.to_string())?;
    let mut out = Vec::new();
    emit(&hir, rng, &mut out);
    String::from_utf8(out).map_err(|err| err.to_string())
}

/// Appends bytes matching one syntax node.
fn emit(hir: &Hir, rng: &mut StdRng, out: &mut Vec<u8>) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(literal) => out.extend_from_slice(&literal.0),
        HirKind::Class(Class::Unicode(class)) => {
            let ranges: Vec<(char, char)> =
                class.ranges().iter().map(|range| (range.start(), range.end())).collect();
            if let Some(ch) = pick_char(&ranges, rng) {
                let mut buf = [0_u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
        HirKind::Class(Class::Bytes(class)) => {
            let ranges: Vec<(char, char)> = class
                .ranges()
                .iter()
                .map(|range| (char::from(range.start()), char::from(range.end())))
                .collect();
            if let Some(ch) = pick_char(&ranges, rng)
                && let Ok(byte) = u8::try_from(u32::from(ch))
            {
                out.push(byte);
            }
        }
        HirKind::Repetition(repetition) => {
            let ceiling = repetition.min.saturating_add(MAX_EXTRA_REPEAT);
            let upper = repetition.max.map_or(ceiling, |max| max.min(ceiling)).max(repetition.min);
            let count = rng.gen_range(repetition.min..=upper);
            for _ in 0..count {
                emit(&repetition.sub, rng, out);
            }
        }
        HirKind::Capture(capture) => emit(&capture.sub, rng, out),
        HirKind::Concat(parts) => {
            for part in parts {
                emit(part, rng, out);
            }
        }
        HirKind::Alternation(branches) => {
            if !branches.is_empty() {
                let index = rng.gen_range(0..branches.len());
                emit(&branches[index], rng, out);
            }
        }
    }
}

/// Picks a character from inclusive ranges, preferring ASCII alphanumerics.
fn pick_char(ranges: &[(char, char)], rng: &mut StdRng) -> Option<char> {
    let readable: Vec<char> = ('0'..='9')
        .chain('a'..='z')
        .chain('A'..='Z')
        .filter(|ch| ranges.iter().any(|(start, end)| start <= ch && ch <= end))
        .collect();
    if !readable.is_empty() {
        return Some(readable[rng.gen_range(0..readable.len())]);
    }
    if ranges.is_empty() {
        return None;
    }
    let (start, _) = ranges[rng.gen_range(0..ranges.len())];
    Some(start)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use rand::SeedableRng;
    use regex::Regex;

    use super::*;

    #[test]
    fn generated_strings_match_their_regex() {
        let mut rng = StdRng::seed_from_u64(7);
        for source in ["[A-Z]{3}-[0-9]{2,4}", "(cat|dog)s?", r"\d+\.\d{2}", "[^a-z]{5}", "a.c"] {
            let anchored = Regex::new(&format!("^(?:{source})$")).unwrap();
            for _ in 0..20 {
                let generated = generate_matching(source, &mut rng).unwrap();
                assert!(anchored.is_match(&generated), "{source} produced {generated}");
            }
        }
    }
}
