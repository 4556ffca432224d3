//! Search Term Tests
//!
//! Tests for construction, validation and serialization of search terms.

use chipmunk::protocol::{validate_token, Condition, SearchTerm};
use chipmunk::ChipmunkError;

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_equals_term_protocol_string() {
    let term = SearchTerm::new("color", Condition::Equals, "red").unwrap();
    assert_eq!(term.to_protocol_string(), "color:=:red");
}

#[test]
fn test_not_equals_term_protocol_string() {
    let term = SearchTerm::not_equals("size", "xl").unwrap();
    assert_eq!(term.to_protocol_string(), "size:!:xl");
}

#[test]
fn test_display_matches_protocol_string() {
    let term = SearchTerm::equals("a", "b").unwrap();
    assert_eq!(term.to_string(), term.to_protocol_string());
}

#[test]
fn test_empty_key_and_value_are_allowed() {
    let term = SearchTerm::equals("", "").unwrap();
    assert_eq!(term.to_protocol_string(), ":=:");
}

#[test]
fn test_colon_is_not_escaped() {
    // `:` is not a framing delimiter; the store splits on the first two
    let term = SearchTerm::equals("time", "12:30").unwrap();
    assert_eq!(term.to_protocol_string(), "time:=:12:30");
}

// =============================================================================
// Condition Tests
// =============================================================================

#[test]
fn test_condition_symbols() {
    assert_eq!(Condition::Equals.symbol(), '=');
    assert_eq!(Condition::NotEquals.symbol(), '!');
}

#[test]
fn test_condition_from_symbol() {
    assert_eq!("=".parse::<Condition>().unwrap(), Condition::Equals);
    assert_eq!("!".parse::<Condition>().unwrap(), Condition::NotEquals);
}

#[test]
fn test_condition_unknown_symbol() {
    let result = "<".parse::<Condition>();
    assert!(matches!(result, Err(ChipmunkError::Validation(_))));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_key_with_delimiter_rejected() {
    for bad in ["a#b", "a|b", "a\nb"] {
        let result = SearchTerm::equals(bad, "v");
        assert!(
            matches!(result, Err(ChipmunkError::Validation(_))),
            "key {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_value_with_delimiter_rejected() {
    for bad in ["#", "x|", "\n"] {
        let result = SearchTerm::not_equals("k", bad);
        assert!(
            matches!(result, Err(ChipmunkError::Validation(_))),
            "value {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_validation_error_names_the_delimiter() {
    let err = SearchTerm::equals("k", "a|b").unwrap_err();
    assert!(err.to_string().contains("'|'"));
}

#[test]
fn test_validate_token_accepts_plain_text() {
    assert!(validate_token("identifier", "user-42_ok:x").is_ok());
}

// =============================================================================
// Setter Tests
// =============================================================================

#[test]
fn test_setters_update_term() {
    let mut term = SearchTerm::equals("a", "1").unwrap();
    term.set_key("b").unwrap();
    term.set_condition(Condition::NotEquals);
    term.set_value("2").unwrap();

    assert_eq!(term.key(), "b");
    assert_eq!(term.condition(), Condition::NotEquals);
    assert_eq!(term.value(), "2");
    assert_eq!(term.to_protocol_string(), "b:!:2");
}

#[test]
fn test_setters_chain() {
    let mut term = SearchTerm::equals("a", "1").unwrap();
    term.set_key("k").unwrap().set_condition(Condition::NotEquals);
    assert_eq!(term.to_protocol_string(), "k:!:1");
}

#[test]
fn test_rejected_setter_leaves_term_unchanged() {
    let mut term = SearchTerm::equals("a", "1").unwrap();

    assert!(term.set_key("bad#key").is_err());
    assert!(term.set_value("bad|value").is_err());

    assert_eq!(term.to_protocol_string(), "a:=:1");
}
