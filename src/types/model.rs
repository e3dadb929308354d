//! Model identifier classification.
//!
//! Model ids arrive as caller-supplied strings. Classification maps them
//! onto a closed set of families that decides which quick heuristic
//! applies: OpenAI ids get an exact BPE count with the model-appropriate
//! vocabulary, the other known vendors get per-family character ratios,
//! and anything unrecognised degrades to a flat ratio instead of failing.

/// BPE vocabulary used by an OpenAI-family model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// `o200k_base` — 4o/4.1/5-class and o-series models.
    O200kBase,
    /// `cl100k_base` — earlier GPT models (gpt-4, gpt-3.5).
    Cl100kBase,
}

impl Vocabulary {
    /// Vocabulary for a lowercased OpenAI model id, `None` for other vendors.
    fn of(id: &str) -> Option<Self> {
        // Newer prefixes first: "gpt-4o" and "gpt-4.1" must not fall
        // through to the plain "gpt-4" check.
        const O200K_PREFIXES: &[&str] = &["gpt-5", "gpt-4o", "gpt-4.1", "chatgpt-4o", "o1", "o3", "o4"];
        const CL100K_PREFIXES: &[&str] = &["gpt-4", "gpt-3.5"];

        if O200K_PREFIXES.iter().any(|p| id.starts_with(p)) {
            return Some(Vocabulary::O200kBase);
        }
        if CL100K_PREFIXES.iter().any(|p| id.starts_with(p)) {
            return Some(Vocabulary::Cl100kBase);
        }
        None
    }
}

/// Model family resolved from a model identifier string.
///
/// Unknown identifiers are not an error; they classify as
/// [`ModelFamily::Unknown`] and receive a flat-ratio estimate so the
/// caller always gets a number to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// OpenAI models, counted exactly with the given vocabulary.
    OpenAi(Vocabulary),
    Claude,
    Gemini,
    DeepSeek,
    /// Unrecognised family — flat characters-per-token approximation.
    Unknown,
}

impl ModelFamily {
    /// Classify a model identifier.
    ///
    /// Matching is case-insensitive and substring based, so versioned ids
    /// (`claude-3-5-sonnet-20241022`, `gemini-1.5-flash-002`) resolve
    /// without an exhaustive table.
    pub fn of(model: &str) -> Self {
        let id = model.to_ascii_lowercase();
        if let Some(vocabulary) = Vocabulary::of(&id) {
            return ModelFamily::OpenAi(vocabulary);
        }
        if id.contains("claude") {
            ModelFamily::Claude
        } else if id.contains("gemini") {
            ModelFamily::Gemini
        } else if id.contains("deepseek") {
            ModelFamily::DeepSeek
        } else {
            ModelFamily::Unknown
        }
    }
}
