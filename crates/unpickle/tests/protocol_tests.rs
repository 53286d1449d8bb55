//! Decoding of literal and container pickles across protocols 0 to 5

use std::str::FromStr;

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use unpickle::*;

fn big(s: &str) -> Value {
    Value::BigInt(BigInt::from_str(s).unwrap().into())
}

fn load(data: &[u8]) -> Value {
    match loads(data) {
        Ok(value) => value,
        Err(e) => panic!("failed to decode {:?}: {}", data, e),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Scalars
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_none() {
    assert_eq!(load(b"N."), Value::None);
    assert_eq!(load(b"\x80\x02N."), Value::None);
}

#[test]
fn test_bool() {
    assert_eq!(load(b"I01\n."), Value::Bool(true));
    assert_eq!(load(b"I00\n."), Value::Bool(false));
    assert_eq!(load(b"\x80\x02\x88."), Value::Bool(true));
    assert_eq!(load(b"\x80\x02\x89."), Value::Bool(false));
}

#[test]
fn test_int_text() {
    assert_eq!(load(b"I42\n."), Value::Int(42));
    assert_eq!(load(b"I-42\n."), Value::Int(-42));
}

#[test]
fn test_same_int_in_every_encoding() {
    let encodings: [&[u8]; 7] = [
        b"I42\n.",
        b"L42L\n.",
        b"\x80\x02K*.",
        b"\x80\x02M*\x00.",
        b"\x80\x02J*\x00\x00\x00.",
        b"\x80\x02\x8a\x01*.",
        b"\x80\x02\x8b\x01\x00\x00\x00*.",
    ];
    for data in encodings {
        assert_eq!(load(data), Value::Int(42), "decoding {:?}", data);
    }
}

#[test]
fn test_binint() {
    assert_eq!(load(b"Jh\x87\x01\x00."), Value::Int(100200));
    assert_eq!(load(b"J\x98x\xfe\xff."), Value::Int(-100200));
    assert_eq!(
        load(b"\x80\x04\x95\x06\x00\x00\x00\x00\x00\x00\x00J\xd4\x11\x01\x00."),
        Value::Int(70100)
    );
}

#[test]
fn test_binint1_and_binint2() {
    assert_eq!(load(b"\x80\x02K*."), Value::Int(42));
    assert_eq!(load(b"\x80\x02M,\x01."), Value::Int(300));
}

#[test]
fn test_float() {
    assert_eq!(load(b"F4.2\n."), Value::Float(4.2));
    assert_eq!(load(b"\x80\x02G?\xf3333333."), Value::Float(1.2));
    assert_eq!(load(b"\x80\x02G\xbf\xf3333333."), Value::Float(-1.2));
}

// ═══════════════════════════════════════════════════════════════════════
// Longs
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_long_text() {
    assert_eq!(load(b"L100200300400L\n."), Value::Int(100200300400));
    assert_eq!(
        load(b"L100200300400500600700L\n."),
        big("100200300400500600700")
    );
    assert_eq!(
        load(b"L-100200300400500600700L\n."),
        big("-100200300400500600700")
    );
}

#[test]
fn test_long1_small() {
    assert_eq!(load(b"\x80\x02\x8a\x05p?gT\x17."), Value::Int(100200300400));
    assert_eq!(
        load(b"\x80\x02\x8a\x05\x90\xc0\x98\xab\xe8."),
        Value::Int(-100200300400)
    );
}

#[test]
fn test_long1_big() {
    let value = load(b"\x80\x02\x8a\t|\xefD\x8fT\xfa\x8en\x05.");
    assert_eq!(value, big("100200300400500600700"));
    assert_eq!(value.as_bigint().unwrap().to_string(), "100200300400500600700");

    let value = load(b"\x80\x02\x8a\t\x84\x10\xbbp\xab\x05q\x91\xfa.");
    assert_eq!(value.as_bigint().unwrap().to_string(), "-100200300400500600700");
}

#[test]
fn test_eight_byte_long_stays_int() {
    assert_eq!(
        load(b"\x8a\x08\xff\xff\xff\xff\xff\xff\xff\x7f."),
        Value::Int(i64::MAX)
    );
    assert_eq!(
        load(b"\x8a\x08\x00\x00\x00\x00\x00\x00\x00\x80."),
        Value::Int(i64::MIN)
    );
}

#[test]
fn test_nine_byte_long_is_big() {
    let value = load(b"\x8a\x09\x00\x00\x00\x00\x00\x00\x00\x80\x00.");
    assert_eq!(value, big("9223372036854775808"));

    let value = load(b"\x8a\x09\xff\xff\xff\xff\xff\xff\xff\x7f\xff.");
    assert_eq!(value, big("-9223372036854775809"));
}

#[test]
fn test_long4() {
    let value = load(b"\x8b\x09\x00\x00\x00|\xefD\x8fT\xfa\x8en\x05.");
    assert_eq!(value, big("100200300400500600700"));
}

// ═══════════════════════════════════════════════════════════════════════
// Text and Bytes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_string_keeps_escapes() {
    assert_eq!(load(b"S'Caf\\xc3\\xa9'\np0\n."), Value::text("Caf\\xc3\\xa9"));
}

#[test]
fn test_short_binstring() {
    assert_eq!(load(b"U\x05Caf\xc3\xa9q\x00."), Value::text("Café"));
}

#[test]
fn test_binstring() {
    let body = "1234567890".repeat(26);
    let mut data = b"T\x04\x01\x00\x00".to_vec();
    data.extend_from_slice(body.as_bytes());
    data.extend_from_slice(b"q\x00.");
    assert_eq!(load(&data), Value::text(body));
}

#[test]
fn test_unicode_line_is_latin1() {
    assert_eq!(load(b"VCaf\xe9\np0\n."), Value::text("Café"));
}

#[test]
fn test_binunicode() {
    assert_eq!(load(b"X\x05\x00\x00\x00Caf\xc3\xa9q\x00."), Value::text("Café"));
    assert_eq!(
        load(b"\x80\x04\x95\t\x00\x00\x00\x00\x00\x00\x00\x8c\x05Caf\xc3\xa9\x94."),
        Value::text("Café")
    );
    assert_eq!(
        load(b"\x8d\x02\x00\x00\x00\x00\x00\x00\x00hi."),
        Value::text("hi")
    );
}

#[test]
fn test_bytes() {
    assert_eq!(load(b"\x80\x03C\x02abq\x00."), Value::bytes(b"ab".to_vec()));

    let body: Vec<u8> = (0..260u32).map(|i| (i % 256) as u8).collect();
    let mut data = b"\x80\x03B\x04\x01\x00\x00".to_vec();
    data.extend_from_slice(&body);
    data.extend_from_slice(b"q\x00.");
    assert_eq!(load(&data), Value::bytes(body.clone()));

    let mut data = b"\x80\x04\x8e\x04\x01\x00\x00\x00\x00\x00\x00".to_vec();
    data.extend_from_slice(&body);
    data.push(b'.');
    assert_eq!(load(&data), Value::bytes(body));
}

#[test]
fn test_byte_array() {
    let value = load(b"\x80\x05\x95\r\x00\x00\x00\x00\x00\x00\x00\x96\x02\x00\x00\x00\x00\x00\x00\x00ab\x94.");
    assert_eq!(value, Value::byte_array(b"ab".to_vec()));
    assert_ne!(value, Value::bytes(b"ab".to_vec()));
}

// ═══════════════════════════════════════════════════════════════════════
// Containers
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_containers() {
    assert_eq!(load(b"(dp0\n."), Value::dict(Dict::new()));
    assert_eq!(load(b"\x80\x02}q\x00."), Value::dict(Dict::new()));
    assert_eq!(load(b"(lp0\n."), Value::list(vec![]));
    assert_eq!(load(b"\x80\x02]q\x00."), Value::list(vec![]));
    assert_eq!(load(b"(t."), Value::tuple(vec![]));
    assert_eq!(load(b"\x80\x02)."), Value::tuple(vec![]));
    assert_eq!(load(b"\x80\x04\x8f\x94."), Value::set(Set::new()));
    assert_eq!(
        load(b"\x80\x04\x95\x04\x00\x00\x00\x00\x00\x00\x00(\x91\x94."),
        Value::frozen_set(vec![])
    );
}

#[test]
fn test_empty_containers_have_zero_length() {
    let encodings: [&[u8]; 5] = [b"}.", b"].", b").", b"\x8f.", b"(\x91."];
    for data in encodings {
        assert_eq!(load(data).len(), Some(0), "decoding {:?}", data);
    }
}

#[test]
fn test_dict_with_item() {
    let value = load(b"(dp0\nVa\np1\nI1\ns.");
    assert_eq!(value.len(), Some(1));
    assert_eq!(value.get(&Value::text("a")), Some(Value::Int(1)));
}

#[test]
fn test_dict_keeps_insertion_order() {
    // {"z": 1, "a": 2, "m": 3} via SETITEMS
    let value = load(b"\x80\x02}(X\x01\x00\x00\x00zK\x01X\x01\x00\x00\x00aK\x02X\x01\x00\x00\x00mK\x03u.");
    let Value::Dict(dict) = &value else {
        panic!("expected dict, got {:?}", value);
    };
    let keys: Vec<String> = dict
        .borrow()
        .keys()
        .map(|k| k.as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn test_tuples() {
    let one = Value::tuple(vec![Value::Int(1)]);
    assert_eq!(load(b"(I1\ntp0\n."), one);
    assert_eq!(load(b"\x80\x02K\x01\x85q\x00."), one);
    assert_eq!(
        load(b"\x80\x02K\x01K\x02\x86q\x00."),
        Value::tuple(vec![Value::Int(1), Value::Int(2)])
    );
    assert_eq!(
        load(b"\x80\x02K\x01K\x02K\x03\x87q\x00."),
        Value::tuple(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn test_lists() {
    assert_eq!(load(b"\x80\x02]q\x00K\x01a."), Value::list(vec![Value::Int(1)]));
    assert_eq!(
        load(b"\x80\x02]q\x00(K\x01K\x02e."),
        Value::list(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn test_sets() {
    let set: Set = [Value::Int(1)].into_iter().collect();
    assert_eq!(
        load(b"\x80\x04\x95\x07\x00\x00\x00\x00\x00\x00\x00\x8f\x94(K\x01\x90."),
        Value::set(set)
    );
    assert_eq!(
        load(b"\x80\x04\x95\x06\x00\x00\x00\x00\x00\x00\x00(K\x01\x91\x94."),
        Value::frozen_set(vec![Value::Int(1)])
    );
}

#[test]
fn test_nested_dicts() {
    let value = load(b"\x80\x04\x95\x18\x00\x00\x00\x00\x00\x00\x00}\x94(\x8c\x01a\x94K\x01\x8c\x01b\x94}\x94\x8c\x01c\x94K\x02su.");
    let expected = Value::dict(
        Dict::new()
            .with_entry("a", 1)
            .with_entry("b", Value::dict(Dict::new().with_entry("c", 2))),
    );
    assert_eq!(value, expected);
}
