// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs next to it; only cross-cutting pieces live here.

/// System prompt fragment that enforces a bare JSON array reply.
pub const JSON_ARRAY_ONLY_SYSTEM: &str = "You MUST respond with a valid JSON array only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
