//! Output generated from the loaded entries rather than from a single page:
//!
//! - **Feed**: RSS 2.0 (`rss.xml`)
//! - **OG**: social preview images with a hash cache

pub mod feed;
pub mod og;
