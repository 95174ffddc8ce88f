//! Integration Tests for Feature Resolution
//!
//! These tests verify that graphs, caches, the resolver and the feature
//! library work together correctly.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use revscore_core::extract::extract_batch;
use revscore_core::features::{proportion_of_symbol_added, standard_graph};
use revscore_core::graph::{ComputeError, GraphBuilder, GraphError, NodeId};
use revscore_core::languages::{Language, RegexLanguage, WordListDictionary};
use revscore_core::resolve::{solve, solve_one, Cache, Resolver, ResolverConfig, SolveError};
use revscore_core::scoring::{
    tsv, CentroidParams, Label, LabelType, NearestCentroid, Observation, ScorerModel,
};
use revscore_core::value::{Value, ValueType};

/// Wrap a one-dependency compute function so every call is counted.
fn counted(
    counter: &Arc<AtomicI32>,
    f: impl Fn(&Value) -> Result<Value, ComputeError> + Send + Sync + 'static,
) -> impl Fn([&Value; 1]) -> Result<Value, ComputeError> + Send + Sync + 'static {
    let counter = counter.clone();
    move |[v]| {
        counter.fetch_add(1, Ordering::SeqCst);
        f(v)
    }
}

fn plus_one(v: &Value) -> Result<Value, ComputeError> {
    Ok(Value::Int(v.as_int().unwrap_or(0) + 1))
}

/// Test that a node shared by several targets is computed once.
#[test]
fn shared_dependency_computed_once() {
    let calls = Arc::new(AtomicI32::new(0));

    let mut builder = GraphBuilder::new();
    let input = builder.input("input", ValueType::Int);
    let shared = builder.feature("shared", ValueType::Int, [input], counted(&calls, plus_one));
    let left = builder.feature("left", ValueType::Int, [shared], |[v]| plus_one(v));
    let right = builder.feature("right", ValueType::Int, [shared], |[v]| plus_one(v));
    let graph = builder.build().unwrap();

    let mut cache = Cache::new().with(input, 1i64);
    let values = solve(&graph, &[left, right, shared], &mut cache).unwrap();

    assert_eq!(values, vec![Value::Int(3), Value::Int(3), Value::Int(2)]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Test that a seeded value short-circuits its whole upstream.
#[test]
fn seeded_value_short_circuits_upstream() {
    let upstream_calls = Arc::new(AtomicI32::new(0));

    let mut builder = GraphBuilder::new();
    let input = builder.input("input", ValueType::Int);
    let expensive = builder.feature(
        "expensive",
        ValueType::Int,
        [input],
        counted(&upstream_calls, plus_one),
    );
    let target = builder.feature("target", ValueType::Int, [expensive], |[v]| plus_one(v));
    let graph = builder.build().unwrap();

    // The input is never seeded; the seed on `expensive` means it is never needed.
    let mut cache = Cache::new().with(expensive, 41i64);
    assert_eq!(solve_one(&graph, target, &mut cache).unwrap(), Value::Int(42));
    assert_eq!(upstream_calls.load(Ordering::SeqCst), 0);
}

/// Test that string seeds are decoded through the node's declared type.
#[test]
fn encoded_seed_is_decoded() {
    let mut builder = GraphBuilder::new();
    let words = builder.input("words", ValueType::Words);
    let count = builder.feature("count", ValueType::Int, [words], |[w]| {
        Ok(Value::Int(w.as_words().map_or(0, |w| w.len()) as i64))
    });
    let graph = builder.build().unwrap();

    let mut cache = Cache::new();
    cache.seed_encoded(words, r#"["a", "b"]"#);
    assert_eq!(solve_one(&graph, count, &mut cache).unwrap(), Value::Int(2));

    let mut cache = Cache::new();
    cache.seed_encoded(words, "not json");
    assert!(matches!(
        solve_one(&graph, count, &mut cache),
        Err(SolveError::Decode { ref name, .. }) if name == "words"
    ));
}

/// Test that a two-node cycle is reported by name, both statically and at
/// resolution time.
#[test]
fn two_node_cycle_is_detected() {
    let mut builder = GraphBuilder::new();
    let a = builder.declare("A", ValueType::Int);
    let b = builder.declare("B", ValueType::Int);
    builder.define_feature(a, [b], |[v]| plus_one(v)).unwrap();
    builder.define_feature(b, [a], |[v]| plus_one(v)).unwrap();
    let graph = builder.build().unwrap();

    assert!(matches!(graph.check_acyclic(), Err(GraphError::Cycle { .. })));

    let mut cache = Cache::new();
    match solve_one(&graph, a, &mut cache) {
        Err(SolveError::GraphCycle { chain }) => assert_eq!(chain, vec!["A", "B", "A"]),
        other => panic!("expected a cycle, got {:?}", other),
    }
}

/// Test that an unseeded input aborts the request.
#[test]
fn missing_input_is_unsatisfied() {
    let (graph, features) = standard_graph::<()>(None).unwrap();
    let (revision, _) = features.inputs();

    let mut cache = Cache::new().with(revision, "text");
    let err = solve(&graph, &[features.edit.words_added], &mut cache).unwrap_err();
    assert!(matches!(
        err,
        SolveError::UnsatisfiedInput { ref name } if name == "parent_revision.text"
    ));
}

/// Test that absent text flows through the feature library as an empty
/// revision.
#[test]
fn absence_propagates_through_features() {
    let (graph, features) = standard_graph::<()>(None).unwrap();
    let (revision, parent) = features.inputs();

    let mut cache = Cache::new()
        .with(revision, "Some text words 55.")
        .with(parent, Value::Absent);
    let values = solve(
        &graph,
        &[
            features.edit.revision.words,
            features.edit.parent.words,
            features.edit.words_added,
            features.edit.symbols_added,
            features.edit.proportion_of_symbol_added,
        ],
        &mut cache,
    )
    .unwrap();

    assert_eq!(
        values,
        vec![
            Value::Words(vec!["Some".into(), "text".into(), "words".into()]),
            Value::Words(vec![]),
            Value::Int(3),
            Value::Int(1),
            Value::Real(1.0),
        ]
    );
}

/// Test the proportion feature's edge cases.
#[test]
fn proportion_of_symbol_added_edge_cases() {
    assert_eq!(proportion_of_symbol_added(10, 1), 0.1);
    assert_eq!(proportion_of_symbol_added(10, 2), 0.2);
    assert_eq!(proportion_of_symbol_added(1, 1), 1.0);

    let (graph, features) = standard_graph::<()>(None).unwrap();
    let (revision, parent) = features.inputs();

    // four symbols, one of them new
    let mut cache = Cache::new().with(revision, "a.b.c.d.").with(parent, "a.b.c.");
    let ratio = solve_one(&graph, features.edit.proportion_of_symbol_added, &mut cache).unwrap();
    assert_eq!(ratio, Value::Real(0.25));
}

/// Test that target order only affects the order of results.
#[test]
fn target_order_does_not_change_values() {
    let (graph, features) = standard_graph::<()>(None).unwrap();
    let (revision, parent) = features.inputs();
    let seeded = Cache::new().with(revision, "new {{text}}").with(parent, "old text");
    let (a, b) = (features.edit.words_added, features.edit.chars_change);

    let forward = solve(&graph, &[a, b], &mut seeded.clone()).unwrap();
    let mut backward = solve(&graph, &[b, a], &mut seeded.clone()).unwrap();
    backward.reverse();

    assert_eq!(forward, backward);
}

/// Test that solving again against a filled cache computes nothing.
#[test]
fn repeated_solve_hits_the_cache() {
    let calls = Arc::new(AtomicI32::new(0));

    let mut builder = GraphBuilder::new();
    let input = builder.input("input", ValueType::Int);
    let target = builder.feature("target", ValueType::Int, [input], counted(&calls, plus_one));
    let graph = builder.build().unwrap();

    let resolver = Resolver::new(&graph, &());
    let mut cache = Cache::new().with(input, 1i64);
    let (first, stats) = resolver.solve_with_stats(&[target], &mut cache).unwrap();
    assert_eq!(stats.computed, 1);

    let (second, stats) = resolver.solve_with_stats(&[target], &mut cache).unwrap();
    assert_eq!(first, second);
    assert_eq!(stats.computed, 0);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Test that a seed skips only the upstream no other target needs.
#[test]
fn seeded_value_keeps_shared_upstream_reachable() {
    let source_calls = Arc::new(AtomicI32::new(0));
    let expensive_calls = Arc::new(AtomicI32::new(0));

    let mut builder = GraphBuilder::new();
    let input = builder.input("input", ValueType::Int);
    let source =
        builder.feature("source", ValueType::Int, [input], counted(&source_calls, plus_one));
    let expensive = builder.feature(
        "expensive",
        ValueType::Int,
        [source],
        counted(&expensive_calls, plus_one),
    );
    let target = builder.feature("target", ValueType::Int, [expensive], |[v]| plus_one(v));
    let other = builder.feature("other", ValueType::Int, [source], |[v]| plus_one(v));
    let graph = builder.build().unwrap();

    let mut cache = Cache::new().with(input, 1i64).with(expensive, 100i64);
    let values = solve(&graph, &[target, other], &mut cache).unwrap();

    assert_eq!(values, vec![Value::Int(101), Value::Int(3)]);
    assert_eq!(expensive_calls.load(Ordering::SeqCst), 0);
    assert_eq!(source_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get(source), Some(&Value::Int(2)));
}

/// A page read by the context-aware datasource below.
struct Page {
    text: String,
}

/// Test that two fresh caches over the same context resolve the same values.
#[test]
fn fresh_caches_resolve_identically() {
    let reads = Arc::new(AtomicI32::new(0));

    let mut builder = GraphBuilder::<Page>::new();
    let counter = reads.clone();
    let text = builder.datasource("page.text", ValueType::Text, [], move |[], page: &Page| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Text(page.text.clone()))
    });
    let length = builder.feature("page.length", ValueType::Int, [text], |[t]| {
        Ok(Value::Int(t.as_text().map_or(0, |t| t.chars().count()) as i64))
    });
    let graph = builder.build().unwrap();

    let page = Page {
        text: "hello world".to_string(),
    };
    let resolver = Resolver::new(&graph, &page);

    let targets = [length, text];
    let (first, first_stats) = resolver.solve_with_stats(&targets, &mut Cache::new()).unwrap();
    let (second, second_stats) = resolver.solve_with_stats(&targets, &mut Cache::new()).unwrap();

    assert_eq!(first, vec![Value::Int(11), Value::Text("hello world".into())]);
    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

/// Test that a depth limit stops long chains before they are walked.
#[test]
fn depth_limit_is_enforced() {
    let mut builder = GraphBuilder::new();
    let mut last: NodeId = builder.input("input", ValueType::Int);
    for i in 0..20 {
        last = builder.feature(format!("step.{}", i), ValueType::Int, [last], |[v]| plus_one(v));
    }
    let graph = builder.build().unwrap();

    let mut cache = Cache::new().with(graph.find("input").unwrap(), 0i64);
    let shallow =
        Resolver::new(&graph, &()).with_config(ResolverConfig::default().with_max_depth(5));
    assert!(matches!(
        shallow.solve_one(last, &mut cache),
        Err(SolveError::DepthExceeded { limit: 5, .. })
    ));

    let resolver = Resolver::new(&graph, &());
    assert_eq!(resolver.solve_one(last, &mut cache).unwrap(), Value::Int(20));
}

/// Test language features on an edit that adds a badword.
#[test]
fn language_features_count_additions() {
    let language: Arc<dyn Language> = Arc::new(
        RegexLanguage::new(
            "en",
            &["stupid"],
            &["lol"],
            Some(Box::new(WordListDictionary::from_words(["this", "is", "stupid", "lol", "fine"]))),
        )
        .unwrap(),
    );
    let (graph, features) = standard_graph::<()>(Some(language)).unwrap();
    let (revision, parent) = features.inputs();
    let lang = features.language.unwrap();

    let mut cache = Cache::new()
        .with(revision, "this is stupid lol stupid")
        .with(parent, "this is fine");
    let values = solve(
        &graph,
        &[lang.badwords_added, lang.informals_added, lang.misspellings_added],
        &mut cache,
    )
    .unwrap();
    assert_eq!(values, vec![Value::Int(2), Value::Int(1), Value::Int(0)]);
    assert_eq!(graph.find("revision.en.badword_count"), Some(lang.revision.badword_count));
}

/// Test extracting a batch, writing it as values/labels and training on it.
#[test]
fn extract_then_train() {
    let (graph, features) = standard_graph::<()>(None).unwrap();
    let (revision, parent) = features.inputs();
    let targets = features.default_targets();

    let edits = [
        ("{{!}}}}{{{!!", "text", true),
        ("[[{{{{]]}}!!", "", true),
        ("text and more text", "text", false),
        ("a long article body", "a long article", false),
    ];
    let caches = edits
        .iter()
        .map(|(current, previous, _)| Cache::new().with(revision, *current).with(parent, *previous))
        .collect();

    let results = extract_batch(&graph, &(), ResolverConfig::default(), &targets, caches);
    let observations: Vec<Observation> = results
        .into_iter()
        .zip(&edits)
        .map(|(values, (_, _, damaging))| Observation::new(values.unwrap(), Label::Bool(*damaging)))
        .collect();

    let mut buffer = Vec::new();
    tsv::write_values_labels(&mut buffer, &observations).unwrap();
    let types: Vec<ValueType> = targets
        .iter()
        .map(|&id| graph.node(id).unwrap().returns())
        .collect();
    let read = tsv::read_values_labels(buffer.as_slice(), &types, LabelType::Bool).unwrap();
    assert_eq!(read, observations);

    let names = targets
        .iter()
        .map(|&id| graph.node(id).unwrap().name().to_string())
        .collect();
    let mut model = NearestCentroid::new(names, CentroidParams::default(), None);
    model.train(&read).unwrap();
    let stats = model.test(&read).unwrap();
    assert_eq!(stats.n, 4);
    assert_eq!(stats.accuracy, 1.0);
}
