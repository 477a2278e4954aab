use super::lookup;
use crate::TokenKind;

#[test]
fn reserved_words_resolve() {
    assert_eq!(lookup("def"), Some(TokenKind::Def));
    assert_eq!(lookup("nonlocal"), Some(TokenKind::Nonlocal));
    assert_eq!(lookup("None"), Some(TokenKind::None));
}

#[test]
fn keywords_are_case_sensitive() {
    assert_eq!(lookup("none"), None);
    assert_eq!(lookup("DEF"), None);
    assert_eq!(lookup("true"), None);
}

#[test]
fn soft_keywords_stay_names() {
    assert_eq!(lookup("match"), None);
    assert_eq!(lookup("case"), None);
    assert_eq!(lookup("type"), None);
}

#[test]
fn round_trips_through_fixed_text() {
    for word in ["and", "async", "await", "class", "finally", "lambda", "while"] {
        let kind = lookup(word);
        assert_eq!(kind.as_ref().and_then(TokenKind::fixed_text), Some(word));
        assert!(kind.is_some_and(|k| k.is_keyword()));
    }
}
