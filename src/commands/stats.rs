use anyhow::Result;

use sitewatch::config::Config;
use sitewatch::crawler::url::LinkClassifier;
use sitewatch::storage::StoreProvider;
use sitewatch::utils::truncate_text;

pub fn stats(config: &Config, url: Option<&str>) -> Result<()> {
    let database = &config.database.sqlite_path;
    if !database.exists() {
        println!("Database not found: {}", database.display());
        println!("Run a crawl first to create the database.");
        return Ok(());
    }

    let provider = StoreProvider::open(&config.database)?;
    let store = provider.handle()?;

    let Some(raw) = url else {
        println!("Link Store Statistics");
        println!("=====================");
        println!("Database: {}", database.display());
        println!();
        println!("Total records: {}", store.count(None)?);
        return Ok(());
    };

    let classifier = LinkClassifier::new(&config.site)?;
    let Some(url) = classifier.canonicalize(raw) else {
        anyhow::bail!("URL is empty");
    };

    match store.get(&url)? {
        Some(record) => {
            println!("Record #{}", record.id);
            println!("  URL:      {}", record.canonical_url);
            println!("  Category: {}", classifier.classify(&url));
            if let Some(snapshot) = record.snapshot {
                println!("  Snapshot: {}", truncate_text(&snapshot, 160));
            }
        }
        None => println!("Not recorded: {url}"),
    }

    Ok(())
}
