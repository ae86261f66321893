use std::sync::Arc;

use make_password::passphrase::corpus::charset::{self, CharacterSet, BUILTIN_CODES};
use make_password::{Corpus, PassphraseError, WordTuple};
use num_bigint::BigUint;

fn builtin(code: &str) -> CharacterSet {
    charset::builtin(code).unwrap_or_else(|| panic!("builtin {} missing", code))
}

#[test]
fn test_builtin_sizes() {
    let expected: &[(&str, usize)] = &[
        ("d", 10),
        ("l", 26),
        ("upper", 26),
        ("a", 36),
        ("A", 62),
        ("x", 16),
        ("X", 16),
        ("B", 64),
        ("b", 64),
        ("s", 94),
        ("base32", 32),
        ("base32upper", 32),
    ];
    for &(code, len) in expected {
        assert_eq!(builtin(code).len(), len, "size of builtin {}", code);
    }
    for code in BUILTIN_CODES {
        assert!(charset::builtin(code).is_some(), "{} is listed but not built", code);
    }
    assert!(charset::builtin("q").is_none());
}

#[test]
fn test_annotated_hints() {
    let alnum = builtin("A");
    let hint_of = |c: &str| {
        alnum
            .entries()
            .iter()
            .find(|e| e.word == c)
            .map(|e| e.hint.clone())
            .unwrap()
    };
    assert_eq!(hint_of("0"), "[zero 0]");
    assert_eq!(hint_of("O"), "[capital O]");
    assert_eq!(hint_of("l"), "[lower l]");
    assert_eq!(hint_of("k"), "k");

    let plain = builtin("d");
    assert_eq!(plain.get(0), Some(&WordTuple::plain("0")), "plain sets are not annotated");
}

#[test]
fn test_duplicates_are_dropped() {
    let set = CharacterSet::new("dup", "abcabc");
    assert_eq!(set.len(), 3);
    assert_eq!(set.get(2), Some(&WordTuple::plain("c")));
}

#[test]
fn test_from_entries_requires_single_characters() {
    let err = CharacterSet::from_entries("bad", vec![WordTuple::plain("ab")]).unwrap_err();
    assert!(matches!(err, PassphraseError::Format(_)));
}

#[test]
fn test_character_corpus_contract() {
    let corpus = Corpus::Characters(builtin("x"));
    assert_eq!(corpus.len(), BigUint::from(16u32));
    assert!(!corpus.is_words());
    assert_eq!(corpus.password_elements(), 1);
    assert!((corpus.entropy().unwrap() - 4.0).abs() < 1e-12);
    assert_eq!(corpus.get_with_hint(&BigUint::from(10u32)).unwrap(), WordTuple::plain("a"));
    assert!(matches!(
        corpus.get_with_hint(&BigUint::from(16u32)),
        Err(PassphraseError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_empty_corpus_has_no_entropy() {
    let corpus = Corpus::Characters(CharacterSet::new("none", ""));
    assert!(corpus.is_empty());
    assert!(matches!(corpus.entropy(), Err(PassphraseError::Domain(_))));
}

#[test]
fn test_subset_of_unsorted_characters() {
    let alnum = Arc::new(Corpus::Characters(builtin("A")));
    let subset = alnum.subset("a-cX").unwrap();
    assert_eq!(subset.simple_len(), Some(4));
    let words: Vec<String> = (0..4).map(|i| subset.entry(i).unwrap().word).collect();
    assert_eq!(words, vec!["a", "b", "c", "X"]);
}
