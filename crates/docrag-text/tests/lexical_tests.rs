use docrag_core::traits::Ranker;
use docrag_core::types::{Document, Query, SourceKind};
use docrag_text::{query_terms, LexicalRanker};

fn doc(uri: &str, chunks: &[&str]) -> Document {
    let chunks: Vec<String> = chunks.iter().map(|c| c.to_string()).collect();
    let raw = chunks.join("\n\n");
    Document::new(uri, format!("Title of {uri}"), raw, chunks)
}

#[test]
fn terms_are_lowercased_deduplicated_and_trimmed() {
    assert_eq!(query_terms("What is PARIS? paris, Paris!"), vec!["what", "is", "paris"]);
    assert!(query_terms("  ?! ").is_empty());
}

#[test]
fn coverage_ranks_chunks_by_matched_terms() {
    let docs = vec![
        doc("a", &["The Eiffel Tower is in Paris.", "Bread and cheese."]),
        doc("b", &["Paris hosts many museums and the tower of Eiffel."]),
    ];
    let ranker = LexicalRanker::default();
    let hits = ranker.rank(&docs, &Query::text("eiffel tower paris"), 5);

    assert_eq!(hits.len(), 3);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert!((hits[1].score - 1.0).abs() < 1e-6);
    // equal scores keep insertion order
    assert_eq!(hits[0].source_uri, "a");
    assert_eq!(hits[1].source_uri, "b");
    assert_eq!(hits[2].content, "Bread and cheese.");
    assert!(!hits[2].confident);
    assert!(hits.iter().all(|h| h.source == SourceKind::Text));
}

#[test]
fn partial_match_scores_fraction_of_terms() {
    let docs = vec![doc("a", &["only the word alpha appears here"])];
    let hits = LexicalRanker::default().rank(&docs, &Query::text("alpha beta"), 5);
    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 0.5).abs() < 1e-6);
    assert!(hits[0].confident);
}

#[test]
fn unmatched_chunks_get_floor_score() {
    let docs = vec![doc("a", &["nothing relevant"])];
    let hits = LexicalRanker::new(0.1).rank(&docs, &Query::text("zebra"), 5);
    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 0.1).abs() < 1e-6);
    assert!(!hits[0].confident);
}

#[test]
fn any_match_outranks_every_floor_score() {
    let query = "one two three four five six seven eight nine ten eleven twelve";
    let docs = vec![doc("a", &["unrelated", "only twelve is here"])];
    let hits = LexicalRanker::new(0.1).rank(&docs, &Query::text(query), 5);
    assert_eq!(hits[0].content, "only twelve is here");
    assert!(hits[0].score > hits[1].score);
}

#[test]
fn empty_query_still_returns_floor_results() {
    let docs = vec![doc("a", &["x", "y"])];
    let hits = LexicalRanker::default().rank(&docs, &Query::text(""), 5);
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.score > 0.0));
}

#[test]
fn results_are_capped_at_top_k() {
    let chunks: Vec<String> = (0..20).map(|i| format!("chunk {i} keyword")).collect();
    let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
    let docs = vec![doc("a", &refs)];
    let ranker = LexicalRanker::default();

    assert_eq!(ranker.rank(&docs, &Query::text("keyword"), 5).len(), 5);
    assert!(ranker.rank(&docs, &Query::text("keyword"), 0).is_empty());
    assert!(ranker.rank(&[], &Query::text("keyword"), 5).is_empty());
}
