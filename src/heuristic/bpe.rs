//! Exact BPE token counting for OpenAI vocabularies.
//!
//! Encoders are process-wide and lazily initialised: loading a vocabulary
//! costs tens of milliseconds once, counting afterwards is pure CPU.

use std::sync::OnceLock;

use tiktoken_rs::{CoreBPE, cl100k_base, o200k_base};

use crate::types::Vocabulary;

static O200K: OnceLock<CoreBPE> = OnceLock::new();
static CL100K: OnceLock<CoreBPE> = OnceLock::new();

fn encoder(vocabulary: Vocabulary) -> &'static CoreBPE {
    match vocabulary {
        Vocabulary::O200kBase => {
            O200K.get_or_init(|| o200k_base().expect("o200k_base vocabulary is embedded"))
        }
        Vocabulary::Cl100kBase => {
            CL100K.get_or_init(|| cl100k_base().expect("cl100k_base vocabulary is embedded"))
        }
    }
}

/// Exact token count of `text` under the given vocabulary.
pub(crate) fn count(vocabulary: Vocabulary, text: &str) -> usize {
    encoder(vocabulary).encode_ordinary(text).len()
}
