/// Chirp body rules: length limit and word censoring.

use crate::error::ValidationError;

pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSOR: &str = "****";

/// Replace profane words with `****`
///
/// Words are whitespace-separated and compared case-insensitively; a word with
/// punctuation attached (`Sharbert!`) is left alone. The result is re-joined with
/// single spaces.
pub fn censor_profanity(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                CENSOR
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate and clean a chirp body
///
/// # Errors
/// `TooLong` when the body exceeds 140 characters
pub fn clean_chirp_body(body: &str) -> Result<String, ValidationError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("Chirp".to_string(), MAX_CHIRP_LENGTH));
    }
    Ok(censor_profanity(body))
}
