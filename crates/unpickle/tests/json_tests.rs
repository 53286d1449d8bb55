//! JSON output of decoded pickles

use pretty_assertions::assert_eq;
use serde_json::json;
use unpickle::hooks::generic_classes;
use unpickle::*;

fn to_json(data: &[u8]) -> String {
    pickle_to_json(data, Hooks::new()).unwrap_or_else(|e| panic!("failed on {:?}: {}", data, e))
}

fn parsed(data: &[u8]) -> serde_json::Value {
    serde_json::from_str(&to_json(data)).expect("emitted JSON must parse")
}

#[test]
fn test_scalars() {
    assert_eq!(to_json(b"N."), "null");
    assert_eq!(to_json(b"I01\n."), "true");
    assert_eq!(to_json(b"I-42\n."), "-42");
    assert_eq!(to_json(b"F4.2\n."), "4.2");
    assert_eq!(to_json(b"\x80\x02G?\xf3333333."), "1.2");
}

#[test]
fn test_big_ints_are_bare_digits() {
    assert_eq!(
        to_json(b"\x80\x02\x8a\t|\xefD\x8fT\xfa\x8en\x05."),
        "100200300400500600700"
    );
    assert_eq!(
        to_json(b"L-100200300400500600700L\n."),
        "-100200300400500600700"
    );
}

#[test]
fn test_nested_dicts() {
    let data = b"\x80\x04\x95\x18\x00\x00\x00\x00\x00\x00\x00}\x94(\x8c\x01a\x94K\x01\x8c\x01b\x94}\x94\x8c\x01c\x94K\x02su.";
    assert_eq!(to_json(data), r#"{"a":1,"b":{"c":2}}"#);
    assert_eq!(parsed(data), json!({"a": 1, "b": {"c": 2}}));
}

#[test]
fn test_sequences_and_sets() {
    assert_eq!(to_json(b"\x80\x02]q\x00(K\x01K\x02e."), "[1,2]");
    assert_eq!(to_json(b"\x80\x02K\x01K\x02K\x03\x87q\x00."), "[1,2,3]");
    assert_eq!(
        to_json(b"\x80\x04\x95\x07\x00\x00\x00\x00\x00\x00\x00\x8f\x94(K\x01\x90."),
        "[1]"
    );
    assert_eq!(to_json(b"(t."), "[]");
}

#[test]
fn test_text_escaping() {
    let value = parsed(b"\x8c\x08a\"b\\\n\x01\xc3\xa9.");
    assert_eq!(value, json!("a\"b\\\n\u{1}é"));
    assert_eq!(to_json(b"\x8c\x08a\"b\\\n\x01\xc3\xa9."), "\"a\\\"b\\\\\\n\\u0001é\"");
}

#[test]
fn test_line_separators_are_escaped() {
    assert_eq!(to_json(b"\x8c\x03\xe2\x80\xa8."), "\"\\u2028\"");
    assert_eq!(to_json(b"\x8c\x03\xe2\x80\xa9."), "\"\\u2029\"");
}

#[test]
fn test_bytes_are_base64() {
    assert_eq!(to_json(b"\x80\x03C\x02abq\x00."), "\"YWI=\"");
    assert_eq!(
        to_json(b"\x80\x05\x95\r\x00\x00\x00\x00\x00\x00\x00\x96\x02\x00\x00\x00\x00\x00\x00\x00ab\x94."),
        "\"YWI=\""
    );
}

#[test]
fn test_dict_order_is_insertion_order() {
    let data = b"\x80\x02}(X\x01\x00\x00\x00zK\x01X\x01\x00\x00\x00aK\x02u.";
    assert_eq!(to_json(data), r#"{"z":1,"a":2}"#);
}

#[test]
fn test_instances_fail() {
    let err = pickle_to_json(b"\x80\x02]c__main__\nFoo\n)\x81a.", generic_classes()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot serialize instance of __main__.Foo to JSON"
    );
}

#[test]
fn test_class_refs_fail() {
    let err = pickle_to_json(b"ccollections\nOrderedDict\n.", Hooks::new()).unwrap_err();
    assert!(matches!(err, UnpickleError::Unserializable(_)));
}

#[test]
fn test_self_referencing_list_hits_depth_limit() {
    let value = loads(b"]q\x00h\x00a.").unwrap();
    assert!(matches!(value.to_json(), Err(UnpickleError::DepthLimit(_))));
}

#[test]
fn test_write_into_buffer() {
    let value = loads(b"\x80\x02]q\x00(K\x01Vx\nNe.").unwrap();
    let mut out = Vec::new();
    json::write(&mut out, &value, &JsonOptions::default()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), r#"[1,"x",null]"#);
}
