//! Tweet embeds from bare status links.
//!
//! A paragraph holding nothing but a twitter.com/x.com status URL (as text
//! or as a single link) becomes an embedded tweet.

use super::classify::sole_link_or_text;
use super::target::{EmbedTarget, normalize_tweet_url};
use crate::embed::twitter::{TWEET_HTML, TweetVars};
use crate::utils::html::escape;
use crate::vdom::{Document, Element, Node, Transform};

/// Replaces tweet-link paragraphs with embed markup.
pub struct TwitterCardTransform;

impl Transform for TwitterCardTransform {
    fn transform(self, mut doc: Document) -> Document {
        embed_tweets(&mut doc.root);
        doc
    }
}

fn embed_tweets(parent: &mut Element) {
    for child in &mut parent.children {
        let Node::Element(elem) = child else {
            continue;
        };

        match tweet_url(elem) {
            Some(url) => {
                crate::debug!("twitter"; "embedded {url}");
                *child = Node::Raw(TWEET_HTML.render(&TweetVars {
                    url: escape(&url).into_owned(),
                }));
            }
            None => embed_tweets(elem),
        }
    }
}

fn tweet_url(p: &Element) -> Option<String> {
    match normalize_tweet_url(sole_link_or_text(p)?)? {
        EmbedTarget::Tweet { url } => Some(url),
        _ => None,
    }
}
