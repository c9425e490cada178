//! Command handlers
//!
//! Every command works on a snapshot file; the ones that change it save it
//! back before returning.

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use tracing::info;

use publist_core::{
    fetch_roster, AdsClient, ArticleStore, AuthorsFormatter, OutputFormat, PublistConfig,
    TargetEncoding, Transcoder,
};

type CmdResult = Result<(), Box<dyn Error>>;

fn open_store(config: &PublistConfig, snapshot: &Path) -> Result<ArticleStore, Box<dyn Error>> {
    let mut store = ArticleStore::new(config);
    store.load(snapshot, false)?;
    Ok(store)
}

pub fn fetch(
    config: &PublistConfig,
    snapshot: &Path,
    roster: Option<&str>,
    fresh: bool,
) -> CmdResult {
    let source = roster
        .or(config.roster.source.as_deref())
        .ok_or("no roster source: pass --roster or set roster.source")?;
    let registry = fetch_roster(source, Duration::from_secs(config.ads.timeout_secs))?;
    let client = AdsClient::new(&config.ads)?;

    let mut store = ArticleStore::new(config);
    if !fresh && snapshot.exists() {
        store.load(snapshot, true)?;
    }

    let mut matches = 0;
    for member in &registry {
        matches += store.add(member, &client)?;
    }
    store.save(snapshot)?;

    info!(
        members = registry.len(),
        matches,
        records = store.len(),
        pending = store.get_require_verification().len(),
        "Fetch complete"
    );
    Ok(())
}

pub fn verify(config: &PublistConfig, snapshot: &Path) -> CmdResult {
    let store = open_store(config, snapshot)?;
    let mut stdout = io::stdout().lock();
    for item in store.get_require_verification() {
        writeln!(stdout, "{}", serde_json::to_string(&item)?)?;
    }
    Ok(())
}

pub fn whitelist(config: &PublistConfig, snapshot: &Path, bibcodes: &[String]) -> CmdResult {
    let mut store = open_store(config, snapshot)?;
    store.white_list(bibcodes);
    store.save(snapshot)?;
    Ok(())
}

pub fn remove(config: &PublistConfig, snapshot: &Path, bibcodes: &[String]) -> CmdResult {
    let mut store = open_store(config, snapshot)?;
    let removed = store.remove(bibcodes);
    info!(removed, requested = bibcodes.len(), "Removed records");
    store.save(snapshot)?;
    Ok(())
}

pub fn whiten(config: &PublistConfig, snapshot: &Path, min_members: usize) -> CmdResult {
    let mut store = open_store(config, snapshot)?;
    let whitened = store.whiten_member_collab(min_members);
    info!(whitened, min_members, "Confirmed multi-member records");
    store.save(snapshot)?;
    Ok(())
}

pub fn render(
    config: &PublistConfig,
    snapshot: &Path,
    format: OutputFormat,
    encoding: Option<TargetEncoding>,
    output: Option<&Path>,
) -> CmdResult {
    let encoding = encoding.unwrap_or(config.output.encoding);
    let mut store = open_store(config, snapshot)?
        .with_transcoder(Transcoder::new(encoding, &config.output.substitutions));
    let authors =
        AuthorsFormatter::new(format).with_replacements(config.output.name_replacements.clone());

    // ADS is only contacted (and a token only required) for uncached records
    let lines = if store.missing_bibliography().is_empty() {
        store.render(&authors, &format)
    } else {
        let client = AdsClient::new(&config.ads)?;
        let lines = store.generate_formatted_output(&client, &authors, &format)?;
        store.save(snapshot)?;
        lines
    };

    let mut text = lines.join("\n");
    text.push('\n');
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!(path = %path.display(), entries = lines.len(), "Wrote publication list");
        }
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }
    Ok(())
}

pub fn count(config: &PublistConfig, snapshot: &Path, arxiv_only: bool) -> CmdResult {
    let store = open_store(config, snapshot)?;
    println!("{}", store.count(arxiv_only));
    Ok(())
}
