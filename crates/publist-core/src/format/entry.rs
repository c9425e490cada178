//! TeX and HTML entry templates

use crate::articles::{ArticleRecord, BibliographyCache};

pub fn name_formatter_html(name: &str) -> String {
    format!("<b>{}</b>", name)
}

/// `\name{...}` with non-breaking spaces
pub fn name_formatter_tex(name: &str) -> String {
    format!("\\name{{{}}}", name.replace(' ', "~"))
}

fn ads_url(bibcode: &str) -> String {
    format!("https://ui.adsabs.harvard.edu/#abs/{}/abstract", bibcode)
}

/// `\entry{title}{authors}{journal}{url}`
///
/// The title comes from the exported BibTeX (already TeX-escaped by ADS);
/// records missing from the bibliography fall back to the search title and
/// the ADS abstract page.
pub fn entry_formatter_tex(
    bibliography: &BibliographyCache,
    record: &ArticleRecord,
    formatted_authors: &str,
) -> String {
    let bib = bibliography.get(&record.bibcode);
    let journal = record.journal().replace('&', "\\&");
    let title = bib
        .and_then(|b| b.title())
        .unwrap_or(record.title.as_str());

    let url = match (bib.and_then(|b| b.doi()), bib.and_then(|b| b.eprint())) {
        (Some(doi), _) => format!("http://dx.doi.org/{}", doi),
        (None, Some(eprint)) => format!("http://arxiv.org/abs/{}", eprint),
        (None, None) => ads_url(&record.bibcode),
    };

    format!(
        "\\entry{{{}}}{{{}}}{{{}}}{{{}}}",
        title, formatted_authors, journal, url
    )
}

/// `<li>` item linking to the publisher (via DOI), arXiv and ADS
pub fn entry_formatter_html(
    bibliography: &BibliographyCache,
    record: &ArticleRecord,
    formatted_authors: &str,
) -> String {
    let bib = bibliography.get(&record.bibcode);
    let journal = record.journal().replace('&', "&amp;");

    let mut links = String::new();
    if let Some(doi) = bib.and_then(|b| b.doi()) {
        links.push_str(&format!(
            "[<a href=\"http://dx.doi.org/{}\">{}</a>]",
            doi, journal
        ));
    }
    if let Some(eprint) = bib.and_then(|b| b.eprint()) {
        links.push_str(&format!(
            "[<a href=\"http://arxiv.org/abs/{}\">arXiv</a>]",
            eprint
        ));
    }
    links.push_str(&format!("[<a href=\"{}\">ADS</a>]", ads_url(&record.bibcode)));

    format!(
        "<li><i>\"{},\"</i> {}. {}</li>",
        record.title, formatted_authors, links
    )
}
