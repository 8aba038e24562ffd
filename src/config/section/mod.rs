//! Configuration section definitions.
//!
//! | Module  | TOML Section    | Purpose                         |
//! |---------|-----------------|---------------------------------|
//! | `site`  | `[site]`        | Title, description, URL, lang   |
//! | `build` | `[build]`       | Content, output, cache paths    |
//! | `feed`  | `[build.feed]`  | RSS output                      |
//! | `og`    | `[build.og]`    | OG image generation and fonts   |

mod build;
mod feed;
mod og;
mod site;

pub use build::BuildSection;
pub use feed::FeedConfig;
pub use og::OgConfig;
pub use site::SiteSection;
