//! Chat-prompt assembly for transform calls.
//!
//! [`build_chat`] turns a stage's `(instruction, input, context)` triple into
//! the `(system_msg, user_msg)` pair any OpenAI-compatible
//! `/v1/chat/completions` endpoint expects:
//!
//! * **system** — the stage instruction, verbatim.
//! * **user**   — labelled sections: detected language (when known), each
//!   upstream stage's output, the primary input, and a trailing `Output:`
//!   cue.
//!
//! The raw seed transcript is deliberately *not* repeated for dependent
//! stages — their primary input is their dependencies' output, so a scoring
//! stage works from the translated/analysed text rather than the original
//! possibly-non-English answer.

use crate::transform::transformer::TransformContext;

// ---------------------------------------------------------------------------
// build_chat
// ---------------------------------------------------------------------------

/// Build a **(system_msg, user_msg)** pair for an OpenAI-compatible API.
///
/// # Example
/// ```rust
/// use voice_inspect::transform::{build_chat, TransformContext};
///
/// let ctx = TransformContext::from_seed("bonjour", Some("fr".into()));
/// let (system, user) = build_chat("Translate to English.", "bonjour", &ctx);
/// assert_eq!(system, "Translate to English.");
/// assert!(user.contains("bonjour"));
/// assert!(user.contains("Detected language: fr"));
/// ```
pub fn build_chat(
    instruction: &str,
    input: &str,
    context: &TransformContext,
) -> (String, String) {
    let system_msg = instruction.trim().to_string();

    let mut user_msg = String::with_capacity(1024);

    if let Some(code) = &context.language_code {
        user_msg.push_str(&format!("Detected language: {code}\n\n"));
    }

    for upstream in &context.upstream {
        user_msg.push_str(&format!(
            "Output of `{}`:\n{}\n\n",
            upstream.stage, upstream.output
        ));
    }

    user_msg.push_str(&format!("Input:\n{input}\n\nOutput:\n"));

    (system_msg, user_msg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_msg_is_the_trimmed_instruction() {
        let ctx = TransformContext::default();
        let (system, _) = build_chat("  Summarise the text.  ", "hello", &ctx);
        assert_eq!(system, "Summarise the text.");
    }

    #[test]
    fn user_msg_contains_input_and_cue() {
        let ctx = TransformContext::default();
        let (_, user) = build_chat("Summarise.", "the quick brown fox", &ctx);

        assert!(user.contains("Input:\nthe quick brown fox"));
        assert!(user.ends_with("Output:\n"));
    }

    #[test]
    fn language_section_present_only_when_known() {
        let with_lang = TransformContext::from_seed("bonjour", Some("fr".into()));
        let (_, user) = build_chat("Translate.", "bonjour", &with_lang);
        assert!(user.contains("Detected language: fr"));

        let without_lang = TransformContext::default();
        let (_, user) = build_chat("Translate.", "bonjour", &without_lang);
        assert!(!user.contains("Detected language:"));
    }

    #[test]
    fn upstream_sections_are_labelled_and_ordered() {
        let ctx = TransformContext::default()
            .with_upstream("translate", "my name is claude")
            .with_upstream("analyze", "the answer is on topic");

        let (_, user) = build_chat("Score the answer.", "the answer is on topic", &ctx);

        let translate_pos = user.find("Output of `translate`:").unwrap();
        let analyze_pos = user.find("Output of `analyze`:").unwrap();
        assert!(translate_pos < analyze_pos, "sections out of order: {user}");
        assert!(user.contains("my name is claude"));
    }

    #[test]
    fn seed_text_is_not_repeated_in_user_msg() {
        // Dependent stages must work from their dependencies' output — the
        // raw seed rides along only as context metadata, never as prompt text.
        let ctx = TransformContext {
            language_code: Some("fr".into()),
            source_text: Some("Bonjour, je m'appelle Claude".into()),
            upstream: vec![],
        }
        .with_upstream("translate", "Hello, my name is Claude");

        let (_, user) = build_chat("Analyse.", "Hello, my name is Claude", &ctx);
        assert!(!user.contains("Bonjour"), "raw seed leaked into prompt: {user}");
    }
}
