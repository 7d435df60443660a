//! Codec Tests
//!
//! Tests for RESP encoding and decoding.

use std::io::{BufReader, Cursor};

use bytes::Bytes;
use respkv::protocol::{
    decode_value, encode_value, read_value, write_value, Line, Value, MAX_LINE_LEN,
};
use respkv::KvError;

fn assert_malformed(bytes: &[u8]) {
    match decode_value(bytes) {
        Err(KvError::MalformedInput(_)) => {}
        other => panic!("Expected MalformedInput for {:?}, got {:?}", bytes, other),
    }
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_simple_string() {
    assert_eq!(&encode_value(&Value::ok())[..], b"+OK\r\n");
}

#[test]
fn test_encode_error() {
    let value = Value::error("ERR boom");
    assert_eq!(&encode_value(&value)[..], b"-ERR boom\r\n");
}

#[test]
fn test_encode_integer() {
    assert_eq!(&encode_value(&Value::Integer(42))[..], b":42\r\n");
    assert_eq!(&encode_value(&Value::Integer(-7))[..], b":-7\r\n");
}

#[test]
fn test_encode_bulk_string() {
    assert_eq!(&encode_value(&Value::bulk("1"))[..], b"$1\r\n1\r\n");
}

#[test]
fn test_encode_empty_bulk_vs_null() {
    assert_eq!(&encode_value(&Value::bulk(Bytes::new()))[..], b"$0\r\n\r\n");
    assert_eq!(&encode_value(&Value::Null)[..], b"$-1\r\n");
}

#[test]
fn test_encode_array() {
    let value = Value::command(["SET", "a", "1"]);
    assert_eq!(
        &encode_value(&value)[..],
        b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n"
    );
}

#[test]
fn test_encode_empty_array() {
    assert_eq!(&encode_value(&Value::Array(vec![]))[..], b"*0\r\n");
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_each_shape() {
    assert_eq!(decode_value(b"+PONG\r\n").unwrap(), Value::SimpleString(Line::lossy("PONG")));
    assert_eq!(decode_value(b"-ERR x\r\n").unwrap(), Value::error("ERR x"));
    assert_eq!(decode_value(b":123\r\n").unwrap(), Value::Integer(123));
    assert_eq!(decode_value(b"$5\r\nhello\r\n").unwrap(), Value::bulk("hello"));
    assert_eq!(decode_value(b"$-1\r\n").unwrap(), Value::Null);
    assert_eq!(decode_value(b"*-1\r\n").unwrap(), Value::Null);
}

#[test]
fn test_decode_bulk_containing_crlf() {
    let decoded = decode_value(b"$4\r\na\r\nb\r\n").unwrap();
    assert_eq!(decoded, Value::bulk("a\r\nb"));
}

#[test]
fn test_decode_nested_array() {
    let decoded = decode_value(b"*2\r\n*1\r\n:1\r\n$0\r\n\r\n").unwrap();
    assert_eq!(
        decoded,
        Value::Array(vec![
            Value::Array(vec![Value::Integer(1)]),
            Value::bulk(Bytes::new()),
        ])
    );
}

#[test]
fn test_round_trip_all_shapes() {
    let values = vec![
        Value::ok(),
        Value::error("ERR wrong"),
        Value::Integer(i64::MIN),
        Value::bulk(Bytes::new()),
        Value::bulk(vec![0u8, 0xFF, b'\r', b'\n']),
        Value::Null,
        Value::Array(vec![]),
        Value::Array(vec![Value::Null, Value::Integer(0), Value::bulk("x")]),
    ];

    for value in values {
        let encoded = encode_value(&value);
        assert_eq!(decode_value(&encoded).unwrap(), value);
    }
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_unknown_tag_is_rejected() {
    assert_malformed(b"?foo\r\n");
    assert_malformed(b"SET a 1\r\n");
}

#[test]
fn test_missing_length_prefix() {
    assert_malformed(b"$\r\nabc\r\n");
    assert_malformed(b"*\r\n");
}

#[test]
fn test_non_numeric_length() {
    assert_malformed(b"$abc\r\nabc\r\n");
    assert_malformed(b"*two\r\n");
}

#[test]
fn test_plus_sign_is_rejected() {
    assert_malformed(b"$+3\r\nabc\r\n");
    assert_malformed(b"*+1\r\n:1\r\n");
    assert_malformed(b":+5\r\n");
    assert_malformed(b":--5\r\n");
    assert_eq!(decode_value(b":-5\r\n").unwrap(), Value::Integer(-5));
}

#[test]
fn test_negative_length_other_than_null() {
    assert_malformed(b"$-2\r\n");
    assert_malformed(b"*-5\r\n");
}

#[test]
fn test_truncated_line() {
    assert_malformed(b"+OK");
    assert_malformed(b"$3");
}

#[test]
fn test_truncated_bulk_payload() {
    assert_malformed(b"$10\r\nshort\r\n");
}

#[test]
fn test_bulk_length_mismatch() {
    // Declared 2, actual payload 3: the byte after the payload is not CR.
    assert_malformed(b"$2\r\nabc\r\n");
}

#[test]
fn test_truncated_array() {
    assert_malformed(b"*3\r\n$1\r\na\r\n");
}

#[test]
fn test_trailing_bytes_rejected() {
    assert_malformed(b"+OK\r\n+OK\r\n");
}

#[test]
fn test_empty_input_rejected() {
    assert_malformed(b"");
}

#[test]
fn test_overlong_line_rejected() {
    let mut bytes = vec![b'+'];
    bytes.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN + 10));
    bytes.extend_from_slice(b"\r\n");
    assert_malformed(&bytes);
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_read_value_clean_eof() {
    let mut reader = Cursor::new(Vec::<u8>::new());
    assert_eq!(read_value(&mut reader).unwrap(), None);
}

#[test]
fn test_read_value_consumes_only_one_value() {
    let mut reader = Cursor::new(b"+A\r\n:2\r\n".to_vec());

    assert_eq!(read_value(&mut reader).unwrap(), Some(Value::simple("A").unwrap()));
    assert_eq!(reader.position(), 4);
    assert_eq!(read_value(&mut reader).unwrap(), Some(Value::Integer(2)));
    assert_eq!(read_value(&mut reader).unwrap(), None);
}

#[test]
fn test_stream_multiple_values() {
    let values = vec![
        Value::command(["PING"]),
        Value::command(["SET", "k", "v"]),
        Value::Null,
        Value::error("ERR oops"),
    ];

    let mut buffer = Vec::new();
    for value in &values {
        write_value(&mut buffer, value).unwrap();
    }

    // A tiny buffer forces reads to straddle refills
    let mut reader = BufReader::with_capacity(3, Cursor::new(buffer));
    for expected in &values {
        assert_eq!(read_value(&mut reader).unwrap().as_ref(), Some(expected));
    }
    assert_eq!(read_value(&mut reader).unwrap(), None);
}
