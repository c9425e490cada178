//! Roster to rendered list, the way the CLI drives it

mod common;

use common::{search_record, MockService, SMITH_QUERY};
use publist_core::{
    load_roster_str, ArticleStore, AuthorsFormatter, OutputFormat, PublistConfig,
};

const ROSTER: &str = "\
name,print,last,first,manual_add
Jane Smith,,Smith,J.,2014SPIE.9145E..0AB
";

const CONFIG: &str = r#"
[affiliation]
institutions = ["stanford"]
collaborations = []
journals_without_affiliation = ["SPIE"]

[output]
encoding = "ascii"

[output.name_replacements]
"Jane Smith" = "J. Smith"
"#;

#[test]
fn test_roster_to_html() {
    let config = PublistConfig::from_toml(CONFIG).unwrap();
    config.validate().unwrap();
    let registry = load_roster_str(ROSTER).unwrap();

    let service = MockService::new()
        .with_results(
            SMITH_QUERY,
            vec![search_record(
                "2015ApJ...800..001S",
                "M\u{fc}ller Galaxies",
                "2015-03-00",
                &["Smith, Jane", "Doe, B."],
                &["Stanford University", "MIT"],
            )],
        )
        .with_results(
            "bibcode:2014SPIE.9145E..0AB",
            vec![search_record(
                "2014SPIE.9145E..0AB",
                "A Telescope",
                "2014-07-00",
                &["Allen, B.", "Smith, J."],
                &["-", "-"],
            )],
        );

    let mut store = ArticleStore::new(&config);
    let mut matches = 0;
    for member in &registry {
        matches += store.add(member, &service).unwrap();
    }
    assert_eq!(matches, 2);

    let worklist = store.get_require_verification();
    assert_eq!(worklist.len(), 1);
    assert_eq!(worklist[0].bibcode, "2014SPIE.9145E..0AB");
    store.white_list(worklist.iter().map(|item| &item.bibcode));
    assert!(store.get_require_verification().is_empty());

    let authors = AuthorsFormatter::new(OutputFormat::Html)
        .with_replacements(config.output.name_replacements.clone());
    let lines = store
        .generate_formatted_output(&service, &authors, &OutputFormat::Html)
        .unwrap();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("<li><i>\"A Telescope,\"</i> Allen, <b>J. Smith</b>."));
    assert!(lines[1].contains(r#"M\"{u}ller Galaxies"#));
    assert!(lines[1].contains("<b>J. Smith</b> et al."));
}

#[test]
fn test_query_constraints_from_config() {
    let config = PublistConfig::from_toml(
        r#"
[query]
rows = 50
max_pages = 2

[query.constraints]
year = "2016"
"#,
    )
    .unwrap();
    let registry = load_roster_str(ROSTER).unwrap();
    let service = MockService::new();

    let mut store = ArticleStore::new(&config);
    for member in registry.iter() {
        store.add(member, &service).unwrap();
    }

    let searches = service.searches.borrow();
    assert_eq!(searches.len(), 2);
    assert!(searches.iter().all(|s| s.rows == 50 && s.max_pages == 2));
    assert_eq!(searches[1].full_query(), "bibcode:2014SPIE.9145E..0AB year:2016");
}
