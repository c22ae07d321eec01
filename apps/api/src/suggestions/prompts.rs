use crate::llm_client::prompts::JSON_ARRAY_ONLY_SYSTEM;

/// System prompt for keyword suggestion.
pub fn suggestion_system() -> String {
    format!(
        "You are a job recommendation assistant that extracts searchable keywords from job postings. {JSON_ARRAY_ONLY_SYSTEM}"
    )
}

/// Keyword suggestion prompt template.
/// Replace `{reaction}`, `{title}`, `{company}`, `{description}`, `{keywords}` before sending.
pub const SUGGESTION_PROMPT_TEMPLATE: &str = r#"You are helping to build an adaptive job recommendation profile for a user.

The user just {reaction}d this job:
- Title: {title}
- Company: {company}
- Description preview: {description}

Their current top keywords are:
{keywords}

Based on this {reaction}, suggest 8-10 keywords that should be added or reinforced in their profile.
For each keyword:
- Use common words that people search jobs with
- Extract skills, technologies, roles, industries, or job attributes
- Assign sentiment: "positive" (user wants this) or "negative" (user avoids this)
- Provide a brief rationale

Return a JSON array with this EXACT schema:
[
  {"keyword": "python", "sentiment": "positive", "rationale": "Job requires Python skills"},
  {"keyword": "entry level", "sentiment": "negative", "rationale": "User dislikes junior roles"}
]

Focus on concrete, searchable terms of at most four words. Avoid overly generic words."#;
