use docrag_core::config::RankingSettings;
use docrag_core::traits::Ranker;
use docrag_core::types::{Document, Query, QueryResult, SourceKind};
use docrag_hybrid::SearchPipeline;

struct Fixed(Vec<QueryResult>);

impl Ranker for Fixed {
    fn rank(&self, _documents: &[Document], _query: &Query<'_>, top_k: usize) -> Vec<QueryResult> {
        self.0.iter().take(top_k).cloned().collect()
    }
}

fn hit(content: &str, source: SourceKind) -> QueryResult {
    QueryResult {
        content: content.into(),
        source_uri: "u".into(),
        title: "t".into(),
        score: 0.5,
        source,
        confident: true,
    }
}

#[test]
fn query_vector_selects_the_primary_ranker() {
    let pipeline = SearchPipeline::new(
        Box::new(Fixed(vec![hit("primary", SourceKind::Vector)])),
        Box::new(Fixed(vec![hit("fallback", SourceKind::Text)])),
    );
    let v = [1.0];

    assert_eq!(pipeline.rank(&[], &Query::embedded("q", &v), 5)[0].content, "primary");
    assert_eq!(pipeline.rank(&[], &Query::text("q"), 5)[0].content, "fallback");
    assert_eq!(pipeline.rank_lexical(&[], "q", 5)[0].content, "fallback");
}

#[test]
fn empty_primary_result_falls_through() {
    let pipeline = SearchPipeline::new(
        Box::new(Fixed(Vec::new())),
        Box::new(Fixed(vec![hit("fallback", SourceKind::Text)])),
    );
    let v = [1.0];
    assert_eq!(pipeline.rank(&[], &Query::embedded("q", &v), 5)[0].content, "fallback");
}

#[test]
fn unembedded_documents_are_ranked_lexically() {
    let doc = Document::new("u", "t", "the eiffel tower", vec!["the eiffel tower".into()]);
    let pipeline = SearchPipeline::from_settings(&RankingSettings::default());
    let v = [1.0, 0.0];

    let hits = pipeline.rank(&[doc], &Query::embedded("eiffel", &v), 5);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, SourceKind::Text);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
}
