//! CSS selectors for the watched site's page templates
//!
//! Each field has an ordered list of selectors; the first one that yields
//! non-empty text wins.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    pub static ref LINKS: Selector = parse_selector!("a[href]");

    pub static ref BODY: Selector = parse_selector!("body");

    // Careers detail page
    pub static ref JOB_TITLE: Vec<Selector> = vec![
        parse_selector!("h2.position-title"),
        parse_selector!(".position-title"),
    ];

    // News articles and press releases share one template
    pub static ref ARTICLE_TITLE: Vec<Selector> = vec![
        parse_selector!("h1.title"),
        parse_selector!("article h1"),
    ];

    // Media gallery detail page
    pub static ref ASSET_TITLE: Vec<Selector> = vec![
        parse_selector!("#asset-title"),
        parse_selector!(".asset-title"),
    ];
}

/// Elements whose text never belongs in a page snapshot
pub const NOISE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];
