use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
pub const SUFFIX_LEN: usize = 6;

/// Lower-cases a display name and joins its words with `-`.
/// Characters that would need escaping in a URL path segment are dropped.
pub fn name_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// `{name-slug}-{suffix}`, or just the suffix when the name has no usable characters.
pub fn published_link(name: &str, suffix: &str) -> String {
    let slug = name_slug(name);
    if slug.is_empty() {
        suffix.to_string()
    } else {
        format!("{slug}-{suffix}")
    }
}

/// Public URLs address a profile as `@{published_link}`.
pub fn parse_handle(handle: &str) -> Option<&str> {
    handle.strip_prefix('@').filter(|link| !link.is_empty())
}
