//! User-initiated profile edits: manual keywords and reset.

use tracing::info;

use crate::config::LearningConfig;
use crate::errors::ProfileError;
use crate::matching::tokenizer::normalize_keyword;
use crate::models::{KeywordEntry, Origin, Polarity, UserProfile};

/// Weight given to a freshly pinned manual keyword.
pub const MANUAL_SEED: f64 = 1.0;

/// Pins a keyword as manual. An existing auto entry with the same text is
/// taken over rather than duplicated; its learned magnitude is kept if larger.
pub fn add_manual_keyword(
    profile: &mut UserProfile,
    text: &str,
    polarity: Polarity,
    hard: bool,
    config: &LearningConfig,
) -> Result<KeywordEntry, ProfileError> {
    let normalized = normalize_keyword(text);
    if normalized.is_empty() {
        return Err(ProfileError::EmptyKeyword);
    }
    if profile.find(&normalized).is_some_and(KeywordEntry::is_manual) {
        return Err(ProfileError::AlreadyManual(normalized));
    }
    if profile.manual_count() >= config.max_manual_keywords {
        return Err(ProfileError::ManualLimitReached {
            limit: config.max_manual_keywords,
        });
    }

    let hard = hard && polarity == Polarity::Negative;
    let entry = match profile.keywords.iter_mut().find(|k| k.text == normalized) {
        Some(existing) => {
            existing.origin = Origin::Manual;
            existing.polarity = polarity;
            existing.weight = polarity.direction() * existing.magnitude().max(MANUAL_SEED);
            existing.hard = hard;
            existing.clone()
        }
        None => {
            let mut entry =
                KeywordEntry::manual(normalized, polarity.direction() * MANUAL_SEED, polarity);
            entry.hard = hard;
            profile.keywords.push(entry.clone());
            entry
        }
    };

    info!(
        "User {} pinned manual {} keyword '{}'",
        profile.user_id, entry.polarity, entry.text
    );
    Ok(entry)
}

/// Removes a manual keyword. Auto entries cannot be removed this way.
pub fn remove_manual_keyword(profile: &mut UserProfile, text: &str) -> Result<(), ProfileError> {
    let normalized = normalize_keyword(text);
    let position = profile
        .keywords
        .iter()
        .position(|k| k.text == normalized && k.is_manual())
        .ok_or_else(|| ProfileError::NotManual(normalized.clone()))?;
    profile.keywords.remove(position);
    Ok(())
}

/// Clears every non-manual keyword. Returns how many were removed.
pub fn reset_profile(profile: &mut UserProfile) -> usize {
    let before = profile.keywords.len();
    profile.keywords.retain(KeywordEntry::is_manual);
    before - profile.keywords.len()
}
