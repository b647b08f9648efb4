//! End-to-end: snapshot on disk -> corpus store -> fitted index -> ranked search.

use job_matcher::document::parser::write_snapshot;
use job_matcher::{
    Corpus, CorpusStore, FallbackScope, Filters, JobRecord, LinkNormalizer, MatchError, RankOptions,
    RawJobRecord, ResolvedQuery, SearchIndex, SearchOutcome, Settings, SortBy, Tokenizer, build_index,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn posting(title: &str, company: &str, location: &str, level: &str, date: &str, link: &str, source: &str) -> JobRecord {
    JobRecord::from(RawJobRecord {
        title: Some(title.to_string()),
        company: Some(company.to_string()),
        location: Some(location.to_string()),
        description: Some(title.to_string()),
        date_posted: Some(date.to_string()),
        skill_level: Some(level.to_string()),
        link: Some(link.to_string()),
        source: Some(source.to_string()),
        skills: None,
    })
}

fn board_corpus() -> Corpus {
    Corpus::new(vec![
        posting("Senior Data Scientist", "Zeta Analytics", "Bangalore", "Senior", "2024-05-02", "/job/1", "Monster"),
        posting("Python Backend Engineer", "Initech", "Pune", "Mid", "2024-04-11", "https://apna.co/job/2", "Apna"),
        posting("Data Analyst", "Acme", "Remote", "Junior", "2024-05-20", "job/3", "Scraped"),
        posting("Frontend Developer", "Globex", "Bangalore", "Mid", "2024-03-30", "/job/4", "Indeed"),
        posting("Machine Learning Engineer", "Acme", "Bangalore", "Senior", "2024-01-05", "/job/5", "Cuvette"),
    ])
}

struct Fixture {
    _dir: TempDir,
    settings: Settings,
    store: CorpusStore,
}

fn fixture(corpus: &Corpus) -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.data.snapshot_path = dir.path().join("data").join("jobs.csv");
    settings.data.index_cache_path = dir.path().join("data").join("index.bin");
    write_snapshot(&settings.data.snapshot_path, corpus).unwrap();

    let store = CorpusStore::new(
        settings.data.snapshot_path.clone(),
        Vec::new(),
        settings.ingest.query.clone(),
        Duration::from_secs(1),
    );
    Fixture {
        _dir: dir,
        settings,
        store,
    }
}

fn titles(outcome: &SearchOutcome) -> Vec<&str> {
    outcome.results.iter().map(|r| r.record.title.as_str()).collect()
}

#[test]
fn only_positive_matches_are_returned() {
    let corpus = Corpus::new(vec![
        JobRecord::from(RawJobRecord {
            title: Some("Python Backend Engineer".to_string()),
            skills: Some("python flask sql".to_string()),
            ..Default::default()
        }),
        JobRecord::from(RawJobRecord {
            title: Some("Frontend Developer".to_string()),
            skills: Some("react css".to_string()),
            ..Default::default()
        }),
    ]);
    let index = SearchIndex::build(corpus, Tokenizer::english(), LinkNormalizer::default());

    let scores = index.scores("python sql");
    assert!(scores[0] > 0.0);
    assert_eq!(scores[1], 0.0);

    let outcome = index
        .search(&ResolvedQuery::text("python sql").unwrap(), &RankOptions::default())
        .unwrap();
    assert_eq!(titles(&outcome), ["Python Backend Engineer"]);
}

#[test]
fn seed_query_terms_rank_by_requested_order() {
    let corpus = Corpus::new(vec![
        posting("Data Scientist", "Zeta", "Pune", "Mid", "2024-02-01", "/1", "Indeed"),
        posting("Senior Data Scientist", "Acme", "Pune", "Senior", "2024-03-01", "/2", "Indeed"),
        posting("Data Scientist Intern", "Mango", "Pune", "Junior", "2024-01-01", "/3", "Indeed"),
    ]);
    let index = SearchIndex::build(corpus, Tokenizer::english(), LinkNormalizer::default());
    let query = ResolvedQuery::text("data scientist").unwrap();

    let by_company = RankOptions {
        sort_by: SortBy::Company,
        ..RankOptions::default()
    };
    let outcome = index.search(&query, &by_company).unwrap();
    let companies: Vec<_> = outcome.results.iter().map(|r| r.record.company.as_str()).collect();
    assert_eq!(companies, ["Acme", "Mango", "Zeta"]);
    assert!(outcome.results.iter().all(|r| r.similarity.is_some_and(|s| s > 0.0)));

    let outcome = index.search(&query, &RankOptions::default()).unwrap();
    assert_eq!(outcome.results[0].record.title, "Data Scientist");
}

#[test]
fn single_posting_corpus_is_matched_by_score() {
    let corpus = Corpus::new(vec![posting("Python Developer", "Initech", "Pune", "Mid", "2024-01-01", "/1", "Indeed")]);
    let index = SearchIndex::build(corpus, Tokenizer::english(), LinkNormalizer::default());

    let outcome = index
        .search(&ResolvedQuery::text("python developer").unwrap(), &RankOptions::default())
        .unwrap();
    assert_eq!(titles(&outcome), ["Python Developer"]);
    assert!(outcome.results[0].similarity.is_some_and(|s| s > 0.0));
}

#[tokio::test]
async fn snapshot_corpus_is_searchable_with_filters_and_sorting() {
    let fixture = fixture(&board_corpus());
    let index = build_index(&fixture.settings, &fixture.store, false).await;
    assert_eq!(index.document_count(), 5);
    assert!(fixture.settings.data.index_cache_path.exists());

    let query = ResolvedQuery::text("data").unwrap();
    let outcome = index.search(&query, &RankOptions::default()).unwrap();
    assert_eq!(titles(&outcome), ["Data Analyst", "Senior Data Scientist"]);

    let by_date = RankOptions {
        sort_by: SortBy::Date,
        ..RankOptions::default()
    };
    let outcome = index.search(&ResolvedQuery::text("engineer").unwrap(), &by_date).unwrap();
    assert_eq!(titles(&outcome), ["Python Backend Engineer", "Machine Learning Engineer"]);

    let in_bangalore = RankOptions {
        filters: Filters {
            location: Some("BANGALORE".to_string()),
            ..Filters::default()
        },
        ..RankOptions::default()
    };
    let outcome = index.search(&query, &in_bangalore).unwrap();
    assert_eq!(titles(&outcome), ["Senior Data Scientist"]);
}

#[tokio::test]
async fn links_are_made_absolute_per_source() {
    let fixture = fixture(&board_corpus());
    let index = build_index(&fixture.settings, &fixture.store, false).await;

    let outcome = index
        .search(&ResolvedQuery::text("data").unwrap(), &RankOptions::default())
        .unwrap();
    let links: Vec<_> = outcome.results.iter().map(|r| r.record.link.as_str()).collect();
    assert_eq!(links, ["https://www.naukri.com/job/3", "https://www.monster.com/job/1"]);
}

#[tokio::test]
async fn unknown_terms_fall_back_to_title_substring() {
    let fixture = fixture(&board_corpus());
    let index = build_index(&fixture.settings, &fixture.store, false).await;

    // "analys" is not a vocabulary term but is part of a title
    let outcome = index
        .search(&ResolvedQuery::text("Analys").unwrap(), &RankOptions::default())
        .unwrap();
    assert_eq!(titles(&outcome), ["Data Analyst"]);
    assert!(outcome.results[0].similarity.is_none());

    let restricted = RankOptions {
        filters: Filters {
            company: Some("globex".to_string()),
            ..Filters::default()
        },
        ..RankOptions::default()
    };
    let outcome = index.search(&ResolvedQuery::text("Analys").unwrap(), &restricted).unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.message.as_deref(), Some("No matching jobs found for 'Analys'."));

    let whole_corpus = RankOptions {
        fallback_scope: FallbackScope::Corpus,
        ..restricted
    };
    let outcome = index.search(&ResolvedQuery::text("Analys").unwrap(), &whole_corpus).unwrap();
    assert_eq!(titles(&outcome), ["Data Analyst"]);
}

#[tokio::test]
async fn empty_corpus_degrades_to_no_results() {
    let fixture = fixture(&Corpus::default());
    // no sources: ingestion yields nothing
    let index = build_index(&fixture.settings, &fixture.store, false).await;
    assert_eq!(index.document_count(), 0);
    assert_eq!(index.vocabulary_size(), 0);

    let outcome = index
        .search(&ResolvedQuery::text("python").unwrap(), &RankOptions::default())
        .unwrap();
    assert!(outcome.results.is_empty());
    assert!(outcome.message.is_some());
}

#[tokio::test]
async fn resume_pipeline_rejects_unsupported_formats() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resume.txt");
    fs::write(&path, "python sql").unwrap();

    let err = ResolvedQuery::resolve(None, Some(&path)).unwrap_err();
    assert!(matches!(err, MatchError::UnsupportedFileFormat { .. }));
    assert_eq!(err.to_string(), "Unsupported file type 'txt'. Please upload PDF or DOCX.");
}

#[test]
fn empty_query_never_reaches_the_scorer() {
    assert!(matches!(
        ResolvedQuery::resolve(Some("  \t "), None),
        Err(MatchError::MalformedQuery)
    ));
}
