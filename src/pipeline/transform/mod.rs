//! Tree rewrites applied to every post.
//!
//! Each transform is a whole-document pass, composed via `Pipeline`.
//!
//! # Modules
//!
//! - `twitter`: bare status links become tweet embeds
//! - `github`: `::github{...}` directives become repo/user cards
//! - `caption`: image + caption pairs become `<figure>`s, images get lazy hints
//! - `target`: validation and normalization of embed targets
//! - `classify`: shape predicates shared by the passes

mod caption;
mod classify;
mod github;
mod target;
mod twitter;

pub use caption::ImageCaptionTransform;
pub use github::GithubCardTransform;
pub use target::{EmbedTarget, normalize_github_target, normalize_tweet_url};
pub use twitter::TwitterCardTransform;
