use std::sync::Arc;

use make_password::passphrase::corpus::charset::{self, CharacterSet};
use make_password::passphrase::corpus::combinatorial::MAX_COMBINATORIAL_LENGTH;
use make_password::passphrase::corpus::CombinatorialGenerator;
use make_password::{Corpus, PassphraseError, WordTuple};
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn builtin(code: &str) -> Arc<Corpus> {
    Arc::new(Corpus::Characters(
        charset::builtin(code).unwrap_or_else(|| panic!("builtin {} missing", code)),
    ))
}

fn chars(name: &str, set: &str) -> Arc<Corpus> {
    Arc::new(Corpus::Characters(CharacterSet::new(name, set)))
}

fn assert_format_error(result: Result<CombinatorialGenerator, PassphraseError>, needle: &str) {
    match result {
        Err(PassphraseError::Format(msg)) => {
            assert!(msg.contains(needle), "expected {:?} in {:?}", needle, msg)
        }
        other => panic!("expected format error containing {:?}, got {:?}", needle, other),
    }
}

#[test]
fn test_disjoint_sets_are_kept() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 1), (builtin("d"), 1)], false).unwrap();
    assert_eq!(generator.lens(), &[26, 10]);
    assert_eq!(generator.reqcounts(), &[1, 1]);
    assert_eq!(generator.total_chars(), 36);
    assert_eq!(generator.name(), "combinatorial(l,d)");
}

#[test]
fn test_superset_loses_smaller_set() {
    // "a" is lowercase + digits; it keeps only the digits.
    let generator = CombinatorialGenerator::new(vec![(builtin("a"), 1), (builtin("l"), 1)], false).unwrap();
    assert_eq!(generator.lens(), &[10, 26], "output keeps input order");
    assert_eq!(generator.sets()[0], "0123456789".chars().collect::<Vec<_>>());

    let sets = generator.sets();
    for c in &sets[0] {
        assert!(!sets[1].contains(c), "{} appears in both sets", c);
    }
}

#[test]
fn test_nested_supersets() {
    // alnum contains lowercase + digits which contains digits.
    let generator = CombinatorialGenerator::new(
        vec![(builtin("A"), 1), (builtin("a"), 1), (builtin("d"), 1)],
        false,
    )
    .unwrap();
    assert_eq!(generator.lens(), &[26, 26, 10]);
    assert!(generator.sets()[0].iter().all(|c| c.is_ascii_uppercase()));
    assert!(generator.sets()[1].iter().all(|c| c.is_ascii_lowercase()));
}

#[test]
fn test_partial_overlap_is_rejected() {
    // Hex digits share a-f with lowercase but are not a superset.
    let result = CombinatorialGenerator::new(vec![(builtin("x"), 1), (builtin("l"), 1)], false);
    assert_format_error(result, "partial overlap");

    let result = CombinatorialGenerator::new(vec![(chars("ab", "ab"), 1), (chars("bc", "bc"), 1)], false);
    assert_format_error(result, "partial overlap");
}

#[test]
fn test_equal_sets_are_rejected() {
    let result = CombinatorialGenerator::new(vec![(builtin("d"), 1), (chars("digits", "9876543210"), 1)], false);
    assert_format_error(result, "sum of some other sets");
}

#[test]
fn test_canonical_mode_rejects_any_overlap() {
    let result = CombinatorialGenerator::new(vec![(builtin("a"), 1), (builtin("l"), 1)], true);
    assert_format_error(result, "not disjoint");

    let ok = CombinatorialGenerator::new(vec![(builtin("l"), 1), (builtin("d"), 1)], true);
    assert!(ok.is_ok(), "disjoint sets are canonical");
}

#[test]
fn test_word_corpus_is_rejected() {
    let words = Arc::new(Corpus::Words(
        make_password::passphrase::corpus::WordList::from_words(
            "fruit",
            ["apple", "banana"].into_iter().map(WordTuple::plain),
        ),
    ));
    let result = CombinatorialGenerator::new(vec![(words, 1), (builtin("d"), 1)], false);
    assert_format_error(result, "only character-based set");
}

#[test]
fn test_count_for_letters_and_digits() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 1), (builtin("d"), 1)], false).unwrap();
    let dictionary = generator.by_length(8).unwrap();
    let expected = BigUint::from(36u32).pow(8) - BigUint::from(26u32).pow(8) - BigUint::from(10u32).pow(8);
    assert_eq!(dictionary.len(), &expected);
    assert_eq!(dictionary.length(), 8);
}

#[test]
fn test_entropy_search_finds_shortest_length() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 1), (builtin("d"), 1)], false).unwrap();
    assert_eq!(generator.minimal_length(40.0).unwrap(), 8, "36^7 is below 2^40");

    let dictionary = generator.by_entropy(40.0).unwrap();
    let corpus = Corpus::Combinatorial(dictionary);
    assert!(corpus.entropy().unwrap() >= 40.0);
    assert_eq!(corpus.password_elements(), 8);

    let shorter = Corpus::Combinatorial(generator.by_length(7).unwrap());
    assert!(shorter.entropy().unwrap() < 40.0, "length 7 must fall short");
}

#[test]
fn test_entropy_search_respects_required_length() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 4), (builtin("d"), 4)], false).unwrap();
    // One bit is reachable with a single character, but eight are required.
    assert_eq!(generator.minimal_length(1.0).unwrap(), 8);
}

#[test]
fn test_entropy_search_gives_up() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 1), (builtin("d"), 1)], false).unwrap();
    let err = generator.by_entropy(1.0e6).unwrap_err();
    assert!(
        matches!(err, PassphraseError::Domain(ref msg) if msg.contains(&MAX_COMBINATORIAL_LENGTH.to_string())),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn test_explicit_length_is_capped() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 1), (builtin("d"), 1)], false).unwrap();
    assert!(generator.by_length(MAX_COMBINATORIAL_LENGTH).is_ok());
    for n in [MAX_COMBINATORIAL_LENGTH + 1, 200_000] {
        let err = generator.by_length(n).unwrap_err();
        assert!(
            matches!(err, PassphraseError::Domain(ref msg) if msg.contains(&n.to_string())),
            "length {}: unexpected error {:?}",
            n,
            err
        );
    }
}

#[test]
fn test_single_character_is_not_enough() {
    let generator = CombinatorialGenerator::new(vec![(chars("z", "z"), 1)], false).unwrap();
    assert!(matches!(generator.minimal_length(8.0), Err(PassphraseError::Format(_))));
}

#[test]
fn test_impossible_length_is_a_domain_error() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 3), (builtin("d"), 3)], false).unwrap();
    assert!(matches!(generator.by_length(5), Err(PassphraseError::Domain(_))));
    assert!(matches!(generator.by_length(0), Err(PassphraseError::Format(_))));
}

#[test]
fn test_elements_meet_requirements() {
    let generator = CombinatorialGenerator::new(
        vec![(builtin("l"), 2), (builtin("upper"), 1), (builtin("d"), 3)],
        false,
    )
    .unwrap();
    let corpus = Corpus::Combinatorial(generator.by_length(8).unwrap());
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let element = corpus.get_randomly(&mut rng).unwrap();
        let word = element.word;
        assert_eq!(word.chars().count(), 8);
        assert!(word.chars().filter(|c| c.is_ascii_lowercase()).count() >= 2, "{}", word);
        assert!(word.chars().filter(|c| c.is_ascii_uppercase()).count() >= 1, "{}", word);
        assert!(word.chars().filter(|c| c.is_ascii_digit()).count() >= 3, "{}", word);
    }
}

#[test]
fn test_indexed_access_is_stable() {
    let generator = CombinatorialGenerator::new(vec![(builtin("l"), 1), (builtin("d"), 1)], false).unwrap();
    let corpus = Corpus::Combinatorial(generator.by_length(3).unwrap());
    let index = BigUint::from(1234u32);
    assert_eq!(
        corpus.get_with_hint(&index).unwrap(),
        corpus.get_with_hint(&index).unwrap(),
        "the same index decodes to the same element"
    );
    assert!(generator.cached_subproblems().unwrap() > 0, "dictionaries share the generator cache");

    let past_end = corpus.len();
    assert!(matches!(
        corpus.get_with_hint(&past_end),
        Err(PassphraseError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_hints_use_longest_annotation() {
    // Plain digits are reduced out of the annotated alphanumerics, but the
    // annotation of each digit survives.
    let generator = CombinatorialGenerator::new(vec![(builtin("d"), 0), (builtin("A"), 0)], false).unwrap();
    let corpus = Corpus::Combinatorial(generator.by_length(1).unwrap());
    assert_eq!(corpus.len(), BigUint::from(62u32));

    let zero = corpus.get_with_hint(&BigUint::from(0u32)).unwrap();
    assert_eq!(zero, WordTuple::new("0", "[zero 0]"));

    let two = corpus.get_with_hint(&BigUint::from(2u32)).unwrap();
    assert_eq!(two, WordTuple::new("2", "2"), "unannotated characters hint themselves");
}

#[test]
fn test_hint_length_counts_characters() {
    // "ééé" is longer in bytes, "ay-ay" in characters.
    let accented = CharacterSet::from_entries("accented", vec![WordTuple::new("a", "ééé")]).unwrap();
    let spelled = CharacterSet::from_entries(
        "spelled",
        vec![WordTuple::new("a", "ay-ay"), WordTuple::plain("b")],
    )
    .unwrap();
    let generator = CombinatorialGenerator::new(
        vec![
            (Arc::new(Corpus::Characters(accented)), 0),
            (Arc::new(Corpus::Characters(spelled)), 0),
        ],
        false,
    )
    .unwrap();
    let corpus = Corpus::Combinatorial(generator.by_length(1).unwrap());
    assert_eq!(corpus.get_with_hint(&BigUint::from(0u32)).unwrap(), WordTuple::new("a", "ay-ay"));
}
