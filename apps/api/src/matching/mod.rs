// Matching engine: tokenizer, scorer, ranker, profile updater, merge resolver.
// Pure computation over data passed in by the caller; no I/O lives here.

pub mod explain;
pub mod manual;
pub mod merge;
pub mod ranker;
pub mod scorer;
pub mod tokenizer;
pub mod updater;
