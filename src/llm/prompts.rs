//! LLM prompts for response generation and judging.
//!
//! Templates use `{placeholder}` markers filled by [`Prompts::fill`].

/// Collection of prompts used by the responders and the judge.
pub struct Prompts;

impl Prompts {
    /// Substitute `{name}` markers in one pass over `template`.
    ///
    /// Substituted text is never rescanned, so values containing marker-like
    /// text come through verbatim. Unknown markers are left as they are.
    pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];

            let value = tail[1..].find('}').and_then(|close| {
                let name = &tail[1..=close];
                values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value, close + 2))
            });

            match value {
                Some((value, consumed)) => {
                    out.push_str(value);
                    rest = &tail[consumed..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// System prompt for a dialogue responder.
    pub fn responder_system() -> &'static str {
        "You are a helpful conversational assistant. Continue the dialogue by replying to the user's latest message. Use what you know from earlier turns. Reply with the message text only."
    }

    /// System prompt for the judge.
    pub fn judge_system() -> &'static str {
        "You are an impartial expert judge of dialogue responses. Always respond with valid JSON when requested."
    }

    /// Prompt to score one response on three criteria.
    pub fn judge_single() -> &'static str {
        r#"You are evaluating a response produced in an ongoing dialogue.

Dialogue context:
{context}

What is known about the user from earlier conversations (memory):
{memory}

Response to evaluate:
{response}

Rate the response on each criterion from 1 (very poor) to 5 (excellent):
1. Faithfulness: Is the response consistent with the dialogue context and the memory, without contradicting or inventing facts?
2. Informativeness: Does the response give useful, specific information that draws on the memory where relevant?
3. Coherency: Is the response a fluent, logical continuation of the dialogue?

Respond in JSON format:
{
    "faithfulness": <1-5>,
    "informativeness": <1-5>,
    "coherency": <1-5>,
    "explanation": "<brief explanation>"
}

Respond with only the JSON, no other text."#
    }

    /// Prompt to compare two responses on the same criteria.
    pub fn judge_pairwise() -> &'static str {
        r#"You are comparing two responses produced in the same dialogue.

Dialogue context:
{context}

What is known about the user from earlier conversations (memory):
{memory}

Response 1:
{response_1}

---

Response 2:
{response_2}

For each criterion, decide which response is better: "1", "2", or "tie".
- faithfulness: consistency with the dialogue context and the memory
- informativeness: useful, specific information that draws on the memory
- coherency: fluent, logical continuation of the dialogue

Respond in JSON format:
{
    "faithfulness": "<1, 2, or tie>",
    "informativeness": "<1, 2, or tie>",
    "coherency": "<1, 2, or tie>",
    "explanation": "<brief explanation>"
}

Respond with only the JSON, no other text."#
    }
}
