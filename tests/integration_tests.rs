//! Integration tests for Scholar Tally
//!
//! These tests drive the public API end to end: input files, pagination over
//! HTTP and scripted fetchers, tallying and the JSON report.

use mockito::{Matcher, Server};
use scholar_tally::batch::{BatchRunner, BlockDecision, CandidateRange, FixedDecision};
use scholar_tally::config::{load_candidates, load_venue_list, Config, DelayConfig, PaginationConfig};
use scholar_tally::matching::{classify, extract_venue, normalize_venue, VenueMatcher};
use scholar_tally::pagination::{ProfilePager, TerminalReason};
use scholar_tally::sources::mock::fixture::{self, Profile, Row};
use scholar_tally::sources::{HttpFetcher, ScriptedFetcher};
use scholar_tally::tally::ProfileAggregator;
use tempfile::tempdir;
use url::Url;

fn smith_profile() -> Profile {
    Profile {
        name: Some("Anna Van Der Berg".to_string()),
        institution: Some("Example Institute".to_string()),
        interests: vec!["Robotics".to_string(), "Control".to_string()],
        citations: (Some(1200), Some(800)),
        h_index: (Some(15), Some(11)),
        i10_index: (Some(20), Some(14)),
    }
}

#[test]
fn test_documented_matching_examples() {
    assert_eq!(normalize_venue("IEEE Trans. Robotics!!"), "ieee trans robotics");
    assert_eq!(extract_venue("Nature, 580(7803), 123-125, 2020"), "Nature");
    assert_eq!(extract_venue("Journal of Foo 12 34-56"), "Journal of Foo");

    let matcher = VenueMatcher::new(["Nature Methods"]);
    assert_eq!(matcher.lookup("nature methods"), Some(0));
    assert_eq!(matcher.lookup("nature methods extra"), None);

    assert!(classify("J Smith", "John Smith").unwrap());
    assert!(!classify("J Smith", "Jane Doe").unwrap());
    assert!(classify("A Van Der Berg", "Anna Van Der Berg").unwrap());
    assert!(classify("A-B-C Smith", "John Smith").is_err());
}

#[tokio::test]
async fn test_paginate_and_tally_over_http() {
    let mut server = Server::new_async().await;

    let first = server
        .mock("GET", "/citations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user".into(), "vdb".into()),
            Matcher::UrlEncoded("view_op".into(), "list_works".into()),
            Matcher::UrlEncoded("cstart".into(), "0".into()),
            Matcher::UrlEncoded("pagesize".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(fixture::profile_page(
            &smith_profile(),
            &[
                Row::new("Grasping", "A Van Der Berg, B Lee", "Science Robotics 5 (2), 1-9")
                    .citations(30)
                    .year(2021),
                Row::new("Walking", "C Kim, A Van Der Berg", "Science Robotics, 6, 2022"),
            ],
        ))
        .expect(1)
        .create_async()
        .await;

    let second = server
        .mock("GET", "/citations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user".into(), "vdb".into()),
            Matcher::UrlEncoded("cstart".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(fixture::profile_page(
            &Profile {
                name: Some("Someone Else".to_string()),
                ..Default::default()
            },
            &[Row::new("Sorting", "D Park", "Nature 600, 1-2")],
        ))
        .expect(1)
        .create_async()
        .await;

    let config = PaginationConfig {
        page_size: 2,
        page_delay: DelayConfig::NONE,
        ..Default::default()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    let base = Url::parse(&format!("{}/citations?user=vdb&hl=en", server.url())).unwrap();

    let matcher = VenueMatcher::new(["Nature", "Science Robotics"]);
    let mut aggregator = ProfileAggregator::new(&matcher, "Anna Van Der Berg");
    let mut pager = ProfilePager::new(&fetcher, base, &config);

    while let Some(page) = pager.next_page().await {
        aggregator.add_page(&page).unwrap();
    }

    first.assert_async().await;
    second.assert_async().await;

    let outcome = pager.outcome().unwrap();
    assert_eq!(outcome.pages, 2);
    assert_eq!(outcome.reason, TerminalReason::Exhausted);

    let aggregate = aggregator.finish();
    assert_eq!(aggregate.front_matter.name.as_deref(), Some("Anna Van Der Berg"));
    assert_eq!(aggregate.front_matter.citations.all, Some(1200));
    assert_eq!(aggregate.article_count, 3);

    let robotics = aggregate.venue("Science Robotics").unwrap();
    assert_eq!(robotics.total, 2);
    assert_eq!(robotics.first_author, 1);
    assert_eq!(robotics.second_author, 1);
    assert_eq!(robotics.last_author, 1);
    assert_eq!(aggregate.venue("Nature").unwrap().total, 1);
    assert_eq!(aggregate.authored_count, 2);
}

#[tokio::test]
async fn test_unexpected_status_over_http() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/citations")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let config = PaginationConfig {
        page_delay: DelayConfig::NONE,
        ..Default::default()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    let base = Url::parse(&format!("{}/citations?user=gone", server.url())).unwrap();
    let mut pager = ProfilePager::new(&fetcher, base, &config);

    assert!(pager.next_page().await.is_none());
    let outcome = pager.outcome().unwrap();
    assert_eq!(outcome.reason, TerminalReason::UnexpectedStatus(404));
    assert!(outcome.likely_blocked());
}

#[tokio::test(start_paused = true)]
async fn test_batch_from_input_files() {
    let dir = tempdir().unwrap();

    let candidates_path = dir.path().join("candidates.json");
    std::fs::write(
        &candidates_path,
        r#"[
            {"id": "r1", "name": "Anna Van Der Berg",
             "profile_url": "https://scholar.google.com/citations?user=vdb&hl=nl"},
            {"id": "r2", "name": "Lee Chen"},
            {"id": "r3", "name": "Maria de la Cruz",
             "profile_url": "https://scholar.google.com/citations?user=mdc"}
        ]"#,
    )
    .unwrap();

    let venues_path = dir.path().join("venues.txt");
    std::fs::write(&venues_path, "Nature\nScience Robotics\n\nCell\n").unwrap();

    let candidates = load_candidates(&candidates_path).unwrap();
    let matcher = VenueMatcher::new(load_venue_list(&venues_path).unwrap());
    assert_eq!(matcher.len(), 3);

    let mut config = Config::default();
    config.pagination.page_size = 3;
    config.paths.cache_dir = dir.path().join("html");
    config.paths.checkpoint = dir.path().join("checkpoint.toml");

    let fetcher = ScriptedFetcher::new();
    fetcher
        .push_ok(fixture::profile_page(
            &smith_profile(),
            &[
                Row::new("One", "A Van Der Berg", "Cell 180, 1-10"),
                Row::new("Two", "B Lee, A Van Der Berg", "Nature, 5, 2019"),
            ],
        ))
        .push_status(503, "")
        .push_ok(fixture::profile_page(
            &Profile {
                name: Some("Maria de la Cruz".to_string()),
                ..Default::default()
            },
            &[Row::new("Three", "M de la Cruz, P Ortiz", "Nature 7, 3-4")],
        ));

    let prompt = FixedDecision(BlockDecision::Halt);
    let report = BatchRunner::new(&config, &fetcher, &matcher, &prompt)
        .run(&candidates, CandidateRange::default())
        .await
        .unwrap();

    assert_eq!(report.completed, 3);
    assert_eq!(report.halted_at, None);

    let json = serde_json::to_value(&report).unwrap();
    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["status"], "scraped");
    assert_eq!(records[0]["aggregate"]["article_count"], 2);
    assert_eq!(records[0]["aggregate"]["venues"][2]["venue"], "Cell");
    assert_eq!(records[0]["aggregate"]["venues"][2]["first_author"], 1);
    assert_eq!(records[0]["aggregate"]["venues"][0]["last_author"], 1);

    assert_eq!(records[1]["status"], "placeholder");
    assert_eq!(records[1]["reason"], "missing_url");

    assert_eq!(records[2]["status"], "scraped");
    assert_eq!(records[2]["aggregate"]["venues"][0]["first_author"], 1);

    assert!(dir.path().join("html").join("vdb_p1.htm").is_file());
    assert!(dir.path().join("html").join("mdc_p1.htm").is_file());
    assert!(dir.path().join("checkpoint.toml").is_file());
}
