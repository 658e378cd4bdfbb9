//! Shortcut destinations offered on the landing page

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickLink {
    pub name: &'static str,
    pub url: &'static str,
    pub category: &'static str,
}

const fn link(name: &'static str, url: &'static str, category: &'static str) -> QuickLink {
    QuickLink { name, url, category }
}

pub const QUICK_LINKS: &[QuickLink] = &[
    link("YouTube", "https://youtube.com", "media"),
    link("Discord", "https://discord.com", "social"),
    link("Reddit", "https://reddit.com", "social"),
    link("Twitter", "https://twitter.com", "social"),
    link("TikTok", "https://tiktok.com", "media"),
    link("Instagram", "https://instagram.com", "social"),
    link("Netflix", "https://netflix.com", "streaming"),
    link("Spotify", "https://spotify.com", "music"),
    link("Twitch", "https://twitch.tv", "streaming"),
    link("GitHub", "https://github.com", "dev"),
    link("Cool Math", "https://coolmathgames.com", "games"),
    link("Now.gg", "https://now.gg", "games"),
];

/// Find a quick link by its display name, ignoring ASCII case
pub fn find(name: &str) -> Option<&'static QuickLink> {
    QUICK_LINKS.iter().find(|l| l.name.eq_ignore_ascii_case(name))
}

/// All quick links in the given category, in display order
pub fn in_category(category: &str) -> impl Iterator<Item = &'static QuickLink> + '_ {
    QUICK_LINKS.iter().filter(move |l| l.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ignores_case() {
        assert_eq!(find("github").map(|l| l.url), Some("https://github.com"));
        assert!(find("gitlab").is_none());
    }

    #[test]
    fn test_categories() {
        let games: Vec<_> = in_category("games").map(|l| l.name).collect();
        assert_eq!(games, vec!["Cool Math", "Now.gg"]);
    }
}
