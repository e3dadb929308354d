//! Quick (synchronous) token estimation.
//!
//! OpenAI-family models get an exact BPE count. Other families get a
//! characters-per-token approximation: Cyrillic text tokenizes denser than
//! Latin on every major vocabulary, so each family carries a pair of ratio
//! constants and the lower one applies when the text contains Cyrillic.

mod bpe;
mod script;

use crate::types::ModelFamily;

/// Characters-per-token ratios for one model family.
///
/// Invariant: `cyrillic < latin` for every family, so the same character
/// count always costs strictly more tokens when the text carries Cyrillic.
#[derive(Debug, Clone, Copy)]
struct ScriptRatios {
    latin: f64,
    cyrillic: f64,
}

const CLAUDE_RATIOS: ScriptRatios = ScriptRatios { latin: 3.8, cyrillic: 2.5 };
const GEMINI_RATIOS: ScriptRatios = ScriptRatios { latin: 4.0, cyrillic: 2.0 };
const DEEPSEEK_RATIOS: ScriptRatios = ScriptRatios { latin: 3.6, cyrillic: 1.7 };

/// Flat divisor for unrecognised model families, script-independent.
const UNKNOWN_CHARS_PER_TOKEN: f64 = 4.0;

/// Heuristic token count for one text field under one model family.
///
/// Empty text is always 0 tokens. Never fails: unknown families degrade
/// to the flat divisor instead of erroring.
pub(crate) fn field_count(family: ModelFamily, text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    match family {
        ModelFamily::OpenAi(vocabulary) => bpe::count(vocabulary, text),
        ModelFamily::Claude => ratio_count(text, CLAUDE_RATIOS),
        ModelFamily::Gemini => ratio_count(text, GEMINI_RATIOS),
        ModelFamily::DeepSeek => ratio_count(text, DEEPSEEK_RATIOS),
        ModelFamily::Unknown => flat_count(text, UNKNOWN_CHARS_PER_TOKEN),
    }
}

fn ratio_count(text: &str, ratios: ScriptRatios) -> usize {
    let chars_per_token = if script::contains_cyrillic(text) {
        ratios.cyrillic
    } else {
        ratios.latin
    };
    flat_count(text, chars_per_token)
}

fn flat_count(text: &str, chars_per_token: f64) -> usize {
    let chars = text.chars().count();
    (chars as f64 / chars_per_token).ceil() as usize
}
