use super::*;

fn decode_chunks(chunks: &[&[u8]]) -> (String, Utf8Carry) {
    let mut carry = Utf8Carry::new();
    let mut out = String::new();
    for chunk in chunks {
        carry.decode_into(chunk, &mut out);
    }
    (out, carry)
}

#[test]
fn ascii_passes_straight_through() {
    let (out, carry) = decode_chunks(&[b"hello ", b"world"]);
    assert_eq!(out, "hello world");
    assert_eq!(carry.pending_len(), 0);
}

#[test]
fn two_byte_sequence_split_across_chunks() {
    let bytes = "café".as_bytes();
    let (head, tail) = bytes.split_at(bytes.len() - 1);
    let (out, carry) = decode_chunks(&[head, tail]);
    assert_eq!(out, "café");
    assert_eq!(carry.pending_len(), 0);
}

#[test]
fn four_byte_sequence_split_byte_by_byte() {
    let bytes = "a🦀b".as_bytes();
    let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
    let (out, _) = decode_chunks(&chunks);
    assert_eq!(out, "a🦀b");
}

#[test]
fn incomplete_tail_is_held_back() {
    let bytes = "ü".as_bytes();
    let (out, carry) = decode_chunks(&[&bytes[..1]]);
    assert_eq!(out, "");
    assert_eq!(carry.pending_len(), 1);
}

#[test]
fn invalid_byte_becomes_replacement_character() {
    let (out, carry) = decode_chunks(&[b"ok\xffok"]);
    assert_eq!(out, "ok\u{fffd}ok");
    assert_eq!(carry.pending_len(), 0);
}

#[test]
fn invalid_byte_after_carried_prefix() {
    let (out, _) = decode_chunks(&[b"x\xe2", b"\x28y"]);
    assert_eq!(out, "x\u{fffd}(y");
}

#[test]
fn clear_reports_dropped_bytes() {
    let bytes = "€".as_bytes();
    let (_, mut carry) = decode_chunks(&[&bytes[..2]]);
    assert_eq!(carry.clear(), 2);
    assert_eq!(carry.pending_len(), 0);
}
