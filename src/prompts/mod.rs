//! Prompt templates.
//!
//! One system prompt per analysis facet. The input text is always sent as
//! the user message, never interpolated into these templates.
//!
//! # Example
//!
//! ```
//! use narrative_deconstruct::prompts::get_prompt_for_facet;
//! use narrative_deconstruct::schema::Facet;
//!
//! let prompt = get_prompt_for_facet(Facet::Omissions);
//! assert!(prompt.contains("omitted_perspective"));
//! ```

mod facets;

pub use facets::{assumptions_prompt, omissions_prompt, sentence_analysis_prompt};

use crate::schema::Facet;

/// Get the system prompt for a facet.
#[must_use]
pub fn get_prompt_for_facet(facet: Facet) -> &'static str {
    match facet {
        Facet::Assumptions => assumptions_prompt(),
        Facet::Sentences => sentence_analysis_prompt(),
        Facet::Omissions => omissions_prompt(),
    }
}
