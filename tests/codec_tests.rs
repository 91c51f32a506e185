//! Text Codec Tests
//!
//! Tests verify:
//! - Parsing of every command form
//! - Argument count and integer errors
//! - Outcome and error formatting

use bytes::Bytes;
use tablekv::protocol::{
    format_error, format_outcome, parse_command, Command, CommandType, Outcome,
};
use tablekv::{Code, Engine, TableError};

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_put() {
    match parse_command("put r k hello").unwrap() {
        Command::Put {
            routing_key,
            key,
            value,
        } => {
            assert_eq!(routing_key, Bytes::from_static(b"r"));
            assert_eq!(key, Bytes::from_static(b"k"));
            assert_eq!(value, Bytes::from_static(b"hello"));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_versioned_commands() {
    match parse_command("vput r k v 3").unwrap() {
        Command::VPut {
            expected_version, ..
        } => assert_eq!(expected_version, 3),
        other => panic!("unexpected command: {:?}", other),
    }

    match parse_command("vdel r k -1").unwrap() {
        Command::VDelete {
            expected_version, ..
        } => assert_eq!(expected_version, -1),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_command_types() {
    let cases = [
        ("put r k v", CommandType::Put),
        ("putifabsent r k v", CommandType::PutIfAbsent),
        ("get r k", CommandType::Get),
        ("del r k v", CommandType::Delete),
        ("vput r k v 0", CommandType::VPut),
        ("vdel r k 0", CommandType::VDelete),
        ("range r a z", CommandType::Range),
        ("delrange r a z", CommandType::DeleteRange),
        ("incr r c 10", CommandType::Increment),
        ("getnum r c", CommandType::GetNumber),
    ];

    for (line, expected) in cases {
        assert_eq!(parse_command(line).unwrap().command_type(), expected, "{}", line);
    }
}

#[test]
fn test_parse_is_case_insensitive_and_trims() {
    let command = parse_command("  GET   r   k  ").unwrap();
    assert_eq!(command.command_type(), CommandType::Get);
    assert_eq!(command.routing_key(), &Bytes::from_static(b"r"));
}

#[test]
fn test_parse_errors() {
    for line in ["", "   ", "bogus r k", "get r", "put r k", "incr r c ten", "vput r k v x"] {
        let err = parse_command(line).unwrap_err();
        assert!(matches!(err, TableError::Protocol(_)), "{:?}", line);
        assert_eq!(err.code(), Code::InvalidArgument);
    }
}

#[test]
fn test_is_mutation() {
    assert!(parse_command("put r k v").unwrap().is_mutation());
    assert!(parse_command("incr r c 1").unwrap().is_mutation());
    assert!(!parse_command("get r k").unwrap().is_mutation());
    assert!(!parse_command("range r a b").unwrap().is_mutation());
    assert!(!parse_command("getnum r c").unwrap().is_mutation());
}

// =============================================================================
// Formatting Tests
// =============================================================================

#[test]
fn test_format_scalar_outcomes() {
    assert_eq!(format_outcome(&Outcome::Done), "OK");
    assert_eq!(format_outcome(&Outcome::Value(None)), "(nil)");
    assert_eq!(
        format_outcome(&Outcome::Value(Some(Bytes::from_static(b"v")))),
        "\"v\""
    );
    assert_eq!(format_outcome(&Outcome::Removed(true)), "true");
    assert_eq!(format_outcome(&Outcome::Version(2)), "(version) 2");
    assert_eq!(format_outcome(&Outcome::Number(-5)), "(integer) -5");
}

#[test]
fn test_format_records() {
    let engine = Engine::default();
    engine.put(b"r", b"a", b"1").unwrap();
    engine.put(b"r", b"b", b"2").unwrap();
    engine.put(b"r", b"b", b"3").unwrap();

    let outcome = engine.execute(parse_command("range r a b").unwrap()).unwrap();
    assert_eq!(format_outcome(&outcome), "1) a => \"1\" @0\n2) b => \"3\" @1");

    let empty = engine.execute(parse_command("range r x z").unwrap()).unwrap();
    assert_eq!(format_outcome(&empty), "(empty)");
}

#[test]
fn test_format_error() {
    let err = TableError::BadRevision {
        expected: 9,
        current: Some(1),
    };
    assert_eq!(
        format_error(&err),
        "(error) BAD_REVISION: Bad revision: expected version 9, current 1"
    );

    let err = TableError::BadRevision {
        expected: 9,
        current: None,
    };
    assert!(format_error(&err).ends_with("current absent"));
}
