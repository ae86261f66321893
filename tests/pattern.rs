use make_password::passphrase::corpus::CharacterSet;
use make_password::passphrase::pattern::{parse, resolve_entropy, GroupSource, Pattern};
use make_password::{Corpus, CorpusRegistry, PassphraseError, WordTuple};

fn registry() -> CorpusRegistry {
    let mut registry = CorpusRegistry::default();
    registry.register("one", || Ok(Corpus::Characters(CharacterSet::new("one", "x"))));
    registry.register("xy", || {
        CharacterSet::from_entries(
            "xy",
            vec![WordTuple::new("x", "[ex]"), WordTuple::new("y", "[why]")],
        )
        .map(Corpus::Characters)
    });
    registry
}

fn parse_ok(spec: &str) -> Pattern {
    parse(spec, &registry(), &mut Vec::new())
        .unwrap_or_else(|e| panic!("{:?} should parse: {}", spec, e))
}

fn parse_err(spec: &str) -> String {
    match parse(spec, &registry(), &mut Vec::new()) {
        Err(PassphraseError::Format(msg)) => msg,
        other => panic!("{:?} should fail with a format error, got {:?}", spec, other),
    }
}

fn resolve(spec: &str) -> (make_password::passphrase::pattern::Resolution, Vec<String>) {
    let mut diag = Vec::new();
    let pattern = parse(spec, &registry(), &mut diag).unwrap();
    let resolution = resolve_entropy(&pattern, &mut diag)
        .unwrap_or_else(|e| panic!("{:?} should resolve: {}", spec, e));
    (resolution, diag)
}

#[test]
fn test_parse_single_word_group() {
    let pattern = parse_ok("-e6");
    assert_eq!(pattern.groups.len(), 1);
    let group = &pattern.groups[0];
    assert_eq!(group.separator.as_deref(), Some("-"));
    assert_eq!(group.repeat, Some(6));
    assert_eq!(group.source.name(), "english");
    assert_eq!(pattern.entropy, None);
}

#[test]
fn test_parse_concatenated_groups() {
    let pattern = parse_ok("d8a8");
    let names: Vec<&str> = pattern.groups.iter().map(|g| g.source.name()).collect();
    assert_eq!(names, vec!["d", "a"]);
    assert!(pattern.groups.iter().all(|g| g.separator.is_none()));

    let pattern = parse_ok("-e8.d2/[xdigit]4");
    let seps: Vec<Option<&str>> = pattern.groups.iter().map(|g| g.separator.as_deref()).collect();
    assert_eq!(seps, vec![Some("-"), Some("."), Some("/")]);
}

#[test]
fn test_parse_quoted_separator() {
    let pattern = parse_ok(r#""::"e2"a\"b"e2""e2"#);
    let seps: Vec<Option<&str>> = pattern.groups.iter().map(|g| g.separator.as_deref()).collect();
    assert_eq!(seps, vec![Some("::"), Some("a\"b"), Some("")]);
}

#[test]
fn test_parse_entropy_target() {
    assert_eq!(parse_ok("A8:64").entropy, Some(64.0));
    assert_eq!(parse_ok("A :64.5").entropy, Some(64.5));
    assert_eq!(parse_ok("-e:40").groups[0].repeat, None);
}

#[test]
fn test_parse_subset_reference() {
    let pattern = parse_ok("[e^a-c]3");
    assert_eq!(pattern.groups[0].source.name(), "english^a-c");
    match &pattern.groups[0].source {
        GroupSource::Simple(corpus) => {
            let len = corpus.simple_len().unwrap();
            for i in 0..len {
                let initial = corpus.initial(i).unwrap().unwrap();
                assert!(('a'..='c').contains(&initial), "{} escaped the subset", initial);
            }
        }
        other => panic!("expected a simple group, got {:?}", other),
    }
}

#[test]
fn test_parse_combinatorial_group() {
    let pattern = parse_ok("{l [upper] d}12");
    assert_eq!(pattern.groups[0].repeat, Some(12));
    match &pattern.groups[0].source {
        GroupSource::Combinatorial(generator) => {
            assert_eq!(generator.lens(), &[26, 26, 10]);
            assert_eq!(generator.reqcounts(), &[1, 1, 1]);
        }
        other => panic!("expected a combinatorial group, got {:?}", other),
    }

    let pattern = parse_ok("{ l2 d }:40");
    match &pattern.groups[0].source {
        GroupSource::Combinatorial(generator) => assert_eq!(generator.reqcounts(), &[2, 1]),
        other => panic!("expected a combinatorial group, got {:?}", other),
    }
}

#[test]
fn test_parse_errors() {
    assert!(parse_err("").starts_with("No format specifier found"));
    assert!(parse_err(":64").starts_with("No format specifier found"));
    assert!(parse_err("d8?").starts_with("parse failed at"));
    assert!(parse_err("d8 :x").starts_with("parse failed at"));
    assert!(parse_err("d0").contains("positive"));
    assert!(parse_err("[one]4").starts_with("not enough candidate"));
    assert!(parse_err("{x l}8").contains("partial overlap"));
    assert!(parse_err("{l e}8").contains("only character-based set"));
    assert!(parse_err("{l ?}8").starts_with("parse failed at"));
}

#[test]
fn test_parse_unknown_corpus() {
    let err = parse("[no-such-corpus]4", &registry(), &mut Vec::new()).unwrap_err();
    assert!(
        matches!(err, PassphraseError::CorpusLoad { ref name, .. } if name == "no-such-corpus"),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn test_resolve_explicit_counts() {
    let (resolution, diag) = resolve("d8");
    assert_eq!(resolution.groups.len(), 1);
    assert_eq!(resolution.groups[0].count, 8);
    assert!(resolution.groups[0].initial);
    assert!((resolution.entropy - 8.0 * 10f64.log2()).abs() < 1e-9);
    assert_eq!(
        diag,
        vec![
            "Entropy computation: 3.322 * 8 = 26.575 bits".to_string(),
            "Entropy computation: total generated entropy 26.575 bits".to_string(),
        ]
    );
}

#[test]
fn test_resolve_last_group_reaches_target() {
    let (resolution, diag) = resolve("d:20");
    assert_eq!(resolution.groups[0].count, 7, "ceil(20 / log2(10))");
    assert!(resolution.entropy >= 20.0);
    assert_eq!(diag[0], "Entropy computation: 3.322 * 7 = 23.253 bits");
}

#[test]
fn test_resolve_unspecified_counts_default_to_one() {
    let (resolution, _) = resolve("e-e-d");
    let counts: Vec<usize> = resolution.groups.iter().map(|g| g.count).collect();
    assert_eq!(counts, vec![1, 1, 1]);

    let (resolution, _) = resolve("e-d4:20");
    assert_eq!(resolution.groups[0].count, 1, "only the last group fills the target");
}

#[test]
fn test_resolve_target_already_met() {
    let (resolution, diag) = resolve("d8-d:10");
    assert_eq!(resolution.groups[1].count, 0);
    assert!(
        !diag.iter().any(|l| l.contains("* 0 =")),
        "empty groups are not reported: {:?}",
        diag
    );
}

#[test]
fn test_resolve_zero_target_with_a_single_group() {
    let (simple, _) = resolve("d:0");
    assert_eq!(simple.groups.len(), 1);
    assert_eq!(simple.groups[0].count, 0);
    assert_eq!(simple.entropy, 0.0);

    let (combinatorial, diag) = resolve("{l d}:0");
    assert!(combinatorial.groups.is_empty(), "nothing left to draw");
    assert_eq!(combinatorial.entropy, 0.0);
    assert_eq!(
        diag.last().map(String::as_str),
        Some("Entropy computation: total generated entropy 0.000 bits")
    );
}

#[test]
fn test_resolve_fills_with_whole_blocks() {
    let (resolution, _) = resolve("d4-d2:30");
    // 6 digits give 19.9 bits; two more 2-digit blocks reach 33.2.
    let counts: Vec<usize> = resolution.groups.iter().map(|g| g.count).collect();
    assert_eq!(counts, vec![4, 2, 2, 2]);
    let initial: Vec<bool> = resolution.groups.iter().map(|g| g.initial).collect();
    assert_eq!(initial, vec![true, false, false, false]);
    assert!(resolution.entropy >= 30.0);
    assert!(resolution.entropy - 30.0 < 2.0 * 10f64.log2(), "stops at the first block past the target");
}

#[test]
fn test_resolve_combinatorial_by_entropy() {
    let (resolution, _) = resolve("{l d}:40");
    assert_eq!(resolution.groups.len(), 1);
    assert_eq!(resolution.groups[0].corpus.password_elements(), 8);

    // A 4-digit prefix leaves 26.7 bits for the combinatorial part.
    let (resolution, _) = resolve("d4{l d}:40");
    assert_eq!(resolution.groups[1].corpus.password_elements(), 6);
    assert!(resolution.entropy >= 40.0);
}

#[test]
fn test_resolve_combinatorial_needs_length() {
    let registry = registry();
    for spec in ["{l d}", "{l d}-d4:40"] {
        let pattern = parse(spec, &registry, &mut Vec::new()).unwrap();
        let err = resolve_entropy(&pattern, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, PassphraseError::Format(_)), "{}: {:?}", spec, err);
    }
}

#[test]
fn test_resolve_words_to_target() {
    let (resolution, _) = resolve("-e:60");
    let e1 = resolution.groups[0].entropy;
    assert_eq!(resolution.groups[0].count, (60.0 / e1).ceil() as usize);
}
