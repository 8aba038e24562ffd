//! Embedded static resources for kiroku.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `github` - GitHub repository/user card widgets
//! - `twitter` - Tweet embed widget
//! - `page` - Post page shell
//! - `css` - Stylesheet for the widgets
//!
//! # Usage
//!
//! ```ignore
//! use embed::twitter::{TWEET_HTML, TweetVars};
//!
//! let html = TWEET_HTML.render(&TweetVars {
//!     url: "https://twitter.com/a/status/1".into(),
//! });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod github {
    use super::{Template, TemplateVars};

    /// Variables for the card templates.
    ///
    /// `*_html` values must be HTML-escaped, `*_json` values must be
    /// script-safe JSON literals.
    pub struct CardVars {
        pub id_html: String,
        pub id_json: String,
        pub target_html: String,
        pub target_json: String,
    }

    impl TemplateVars for CardVars {
        fn pairs(&self) -> Vec<(&'static str, &str)> {
            vec![
                ("__ID__", self.id_html.as_str()),
                ("__ID_JSON__", &self.id_json),
                ("__TARGET__", &self.target_html),
                ("__TARGET_JSON__", &self.target_json),
            ]
        }
    }

    /// Repository card: description, stars, forks, license, language.
    pub const REPO_CARD_HTML: Template<CardVars> =
        Template::new(include_str!("github/repo.html"));

    /// User card: followers, public repositories, location.
    pub const USER_CARD_HTML: Template<CardVars> =
        Template::new(include_str!("github/user.html"));
}

pub mod twitter {
    use super::{Template, TemplateVars};

    /// Variables for the tweet embed. `url` must be HTML-escaped.
    pub struct TweetVars {
        pub url: String,
    }

    impl TemplateVars for TweetVars {
        fn pairs(&self) -> Vec<(&'static str, &str)> {
            vec![("__URL__", &self.url)]
        }
    }

    /// Blockquote plus a loader that fetches widgets.js once per page.
    pub const TWEET_HTML: Template<TweetVars> =
        Template::new(include_str!("twitter/card.html"));
}

pub mod page {
    use super::{Template, TemplateVars};

    /// Variables for post.html. Everything except `content` and `tags` is
    /// HTML-escaped by the caller; those two are already markup.
    #[derive(Debug, Default)]
    pub struct PostVars {
        pub lang: String,
        pub title: String,
        pub site_title: String,
        pub description: String,
        pub canonical: String,
        pub feed: String,
        pub og_image: String,
        pub stylesheet: String,
        pub date: String,
        pub datetime: String,
        pub tags: String,
        pub content: String,
    }

    impl TemplateVars for PostVars {
        fn pairs(&self) -> Vec<(&'static str, &str)> {
            vec![
                ("__LANG__", self.lang.as_str()),
                ("__TITLE__", &self.title),
                ("__SITE_TITLE__", &self.site_title),
                ("__DESCRIPTION__", &self.description),
                ("__CANONICAL__", &self.canonical),
                ("__FEED__", &self.feed),
                ("__OG_IMAGE__", &self.og_image),
                ("__STYLESHEET__", &self.stylesheet),
                ("__DATE__", &self.date),
                ("__DATETIME__", &self.datetime),
                ("__TAGS__", &self.tags),
                ("__CONTENT__", &self.content),
            ]
        }
    }

    /// Full HTML document for one post.
    pub const POST_HTML: Template<PostVars> =
        Template::new(include_str!("page/post.html"));
}

pub mod css {
    /// Output path of the stylesheet, relative to the output root.
    pub const EMBEDS_CSS_PATH: &str = "styles/embeds.css";

    /// Styles for captions, GitHub cards and tweets.
    pub const EMBEDS_CSS: &str = include_str!("css/embeds.css");
}
