//! Pronoun reflection ("I feel lost" -> "you feel lost").

/// Swap first and second person in a single lower-cased word.
fn swap(word: &str) -> &str {
    match word {
        "i" | "me" => "you",
        "my" => "your",
        "mine" => "yours",
        "myself" => "yourself",
        "am" => "are",
        "i'm" => "you're",
        "i've" => "you've",
        "i'll" => "you'll",
        "i'd" => "you'd",
        "you" => "me",
        "your" => "my",
        "yours" => "mine",
        "yourself" => "myself",
        "you're" => "I'm",
        "you've" => "I've",
        other => other,
    }
}

/// Lower-case a message, trim punctuation and swap pronouns word by word.
pub fn reflect(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .map(|word| swap(&word).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a message into lower-cased word tokens, keeping apostrophes.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_swaps_pronouns() {
        assert_eq!(reflect("I feel lost in my job."), "you feel lost in your job");
        assert_eq!(reflect("I'm tired of you"), "you're tired of me");
        assert_eq!(reflect("  Am I   ok?! "), "are you ok");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Can't sleep... AGAIN!"),
            vec!["can't".to_string(), "sleep".to_string(), "again".to_string()]
        );
        assert!(tokenize("?!").is_empty());
    }
}
