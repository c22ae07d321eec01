pub mod interaction;
pub mod job;
pub mod keyword;
pub mod profile;

pub use interaction::{Action, Feedback};
pub use job::JobRecord;
pub use keyword::{KeywordEntry, Origin, Polarity};
pub use profile::{UserProfile, UserSettings};
