//! Prompt builders for the option-generation endpoint.

/// Wrap a spoken question in the option-request template. The question is
/// passed through verbatim; the backend sees exactly what was said.
pub fn options_prompt(question: &str) -> String {
    format!(
        "Provide 3-5 short, single-phrase options for the following question: {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_verbatim() {
        assert_eq!(
            options_prompt("what should I eat"),
            "Provide 3-5 short, single-phrase options for the following question: what should I eat"
        );
    }

    #[test]
    fn question_is_not_escaped_or_trimmed() {
        let q = "what's \"good\" today?";
        assert!(options_prompt(q).ends_with(q));
    }
}
