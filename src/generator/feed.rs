//! RSS 2.0 feed generation.
//!
//! Items are the non-draft entries of every collection, newest first.

use crate::content::Entry;
use crate::{config::SiteConfig, freshness::write_if_changed, log};
use anyhow::{Context, Result, anyhow};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};

/// Build and write the feed if enabled.
pub fn build_feed(config: &SiteConfig, entries: &[Entry]) -> Result<()> {
    if !config.build.feed.enable {
        return Ok(());
    }
    RssFeed::new(config, entries).write()
}

struct RssFeed<'a> {
    config: &'a SiteConfig,
    entries: Vec<&'a Entry>,
}

impl<'a> RssFeed<'a> {
    fn new(config: &'a SiteConfig, entries: &'a [Entry]) -> Self {
        let mut entries: Vec<_> = entries.iter().filter(|e| !e.draft).collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Self { config, entries }
    }

    fn into_xml(self) -> Result<String> {
        let site = &self.config.site;
        let base_url = site.base_url();
        let items: Vec<_> = self
            .entries
            .iter()
            .map(|entry| entry_to_rss_item(entry, base_url))
            .collect();

        let channel = ChannelBuilder::default()
            .title(&site.title)
            .link(base_url)
            .description(&site.description)
            .language(Some(site.language.clone()))
            .generator(Some(env!("CARGO_PKG_NAME").to_string()))
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| anyhow!("RSS validation failed: {e}"))?;
        Ok(channel.to_string())
    }

    fn write(self) -> Result<()> {
        let path = self.config.feed_output();
        let count = self.entries.len();
        let xml = self.into_xml()?;

        write_if_changed(&path, xml.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;

        log!("feed"; "{} ({} items)", path.file_name().unwrap_or_default().to_string_lossy(), count);
        Ok(())
    }
}

fn entry_to_rss_item(entry: &Entry, base_url: &str) -> rss::Item {
    let link = format!("{}{}", base_url, entry.permalink());
    let description = Some(entry.description.clone()).filter(|d| !d.is_empty());

    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(description)
        .pub_date(Some(entry.date.to_rfc2822()))
        .categories(
            entry
                .tags
                .iter()
                .map(|tag| rss::CategoryBuilder::default().name(tag.clone()).build())
                .collect::<Vec<_>>(),
        )
        .build()
}
