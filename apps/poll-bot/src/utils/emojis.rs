/// Keycap digits one through ten, the stock reaction set for new servers.
pub const DEFAULT_EMOJIS: [&str; 10] = [
    "1\u{fe0f}\u{20e3}",
    "2\u{fe0f}\u{20e3}",
    "3\u{fe0f}\u{20e3}",
    "4\u{fe0f}\u{20e3}",
    "5\u{fe0f}\u{20e3}",
    "6\u{fe0f}\u{20e3}",
    "7\u{fe0f}\u{20e3}",
    "8\u{fe0f}\u{20e3}",
    "9\u{fe0f}\u{20e3}",
    "\u{1f51f}",
];

pub fn default_emojis() -> Vec<String> {
    DEFAULT_EMOJIS.iter().map(|e| (*e).to_string()).collect()
}

/// Split a comma-separated emoji list, trimming each token and dropping empty ones.
pub fn parse_emoji_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_emojis(emojis: &[String]) -> String {
    emojis.join(",")
}

/// Pick exactly `count` emojis for a poll's options.
///
/// Custom emojis fill the leading positions; server defaults fill the rest.
/// When both together are still too short the combined list is reused
/// cyclically, and an entirely empty source falls back to [`DEFAULT_EMOJIS`].
pub fn resolve_emojis(custom: Option<&str>, defaults: &[String], count: usize) -> Vec<String> {
    let custom = custom.map(parse_emoji_list).unwrap_or_default();
    if custom.len() >= count {
        return custom.into_iter().take(count).collect();
    }

    let mut pool: Vec<String> = custom.into_iter().chain(defaults.iter().cloned()).collect();
    if pool.is_empty() {
        pool = default_emojis();
    }

    (0..count).map(|i| pool[i % pool.len()].clone()).collect()
}
