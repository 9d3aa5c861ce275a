// Shared prompt constants used by the gateway.
// Stage-specific templates live in pipelines::prompts and recommendation::prompts.

/// System prompt for every contract-bound stage.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant that designs \
    career assessments for students and early-career job seekers. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for stages that return a short free-text answer.
pub const FREE_TEXT_SYSTEM: &str = "You are a concise career advisor. \
    Answer with the requested text only: no preamble, no quotes, no markdown.";

/// Appended to every contract-bound prompt, followed by the contract's shape.
pub const CONTRACT_INSTRUCTION: &str = "\
    Return a JSON object with this EXACT shape (same field names, no extra fields):";

/// Fills `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so caller text that happens to contain
/// `{gaps}` or similar is inserted verbatim. Unknown placeholders are left as-is.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
