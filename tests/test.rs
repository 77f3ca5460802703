// These tests are adapted from the classic librope test suite:
// https://github.com/josephg/librope/blob/master/test/tests.c

use rand::Rng;
use skiprope::Rope;

const UCHARS: [char; 23] = [
    'a', 'b', 'c', '1', '2', '3', ' ', '\n', // ASCII
    '©', '¥', '½', // The Latin-1 supplement (U+80 - U+ff)
    'Ύ', 'Δ', 'δ', 'Ϡ', // Greek (U+0370 - U+03FF)
    '←', '↯', '↻', '⇈', // Arrows (U+2190 - U+21FF)
    '𐆐', '𐆔', '𐆘', '𐆚', // Ancient roman symbols (U+10190 - U+101CF)
];

const CHARS: &[u8; 83] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()[]{}<>?,./";

fn random_ascii_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char).collect()
}

fn random_unicode_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| UCHARS[rng.gen_range(0..UCHARS.len())]).collect()
}

fn check(r: &Rope, expected: &str) {
    r.check();
    assert_eq!(r.to_string(), expected);
    assert_eq!(r.len_bytes(), expected.len());
    assert_eq!(r.char_len(), expected.chars().count());
    assert_eq!(r, &Rope::from(expected), "rope comparison fails");
}

#[test]
fn empty_rope_has_no_contents() {
    let mut r = Rope::new();
    check(&r, "");

    r.insert(0, "");
    check(&r, "");
}

#[test]
fn insert_at_location() {
    let mut r = Rope::new();

    r.insert(0, "AAA");
    check(&r, "AAA");

    r.insert(0, "BBB");
    check(&r, "BBBAAA");

    r.insert(6, "CCC");
    check(&r, "BBBAAACCC");

    r.insert(5, "DDD");
    check(&r, "BBBAADDDACCC");
}

#[test]
fn insert_past_the_end_clamps() {
    let mut r = Rope::from("hi");
    r.insert(1000, "!");
    check(&r, "hi!");
}

#[test]
fn new_string_has_content() {
    let r = Rope::from("hi there");
    check(&r, "hi there");

    let mut r = Rope::from("κόσμε");
    check(&r, "κόσμε");
    r.insert(2, "𝕐𝕆😘");
    check(&r, "κό𝕐𝕆😘σμε");
}

#[test]
fn delete_at_location() {
    let mut r = Rope::from("012345678");

    r.delete(8, 1);
    check(&r, "01234567");

    r.delete(0, 1);
    check(&r, "1234567");

    r.delete(5, 1);
    check(&r, "123457");

    r.delete(5, 1);
    check(&r, "12345");

    r.delete(0, 5);
    check(&r, "");
}

#[test]
fn delete_past_end_of_string() {
    let mut r = Rope::new();

    r.delete(0, 100);
    check(&r, "");

    r.insert(0, "hi there");
    r.delete(3, 10);
    check(&r, "hi ");
}

#[test]
fn delete_is_insert_inverse() {
    let original = "the quick brown fox jumps over the lazy dog";
    let mut r = Rope::from(original);
    r.insert(16, "red ");
    check(&r, "the quick brown red fox jumps over the lazy dog");
    r.delete(16, 4);
    check(&r, original);
}

#[test]
fn remove_by_range() {
    let mut r = Rope::from("Whoa dawg!");
    r.remove(4..9);
    check(&r, "Whoa!");
}

#[test]
fn replace_shrinking_and_growing() {
    let mut r = Rope::from("Hi Mike!");
    r.replace(3..7, "Duane");
    check(&r, "Hi Duane!");

    r.replace(0..2, "Yo");
    check(&r, "Yo Duane!");
}

#[test]
fn really_long_ascii_string() {
    let len = 2000;
    let s = random_ascii_string(len);

    let mut r = Rope::from(s.as_str());
    check(&r, s.as_str());

    // Delete everything but the first and last characters.
    r.delete(1, len - 2);
    let expect = format!("{}{}", s.as_bytes()[0] as char, s.as_bytes()[len - 1] as char);
    check(&r, expect.as_str());
}

#[test]
fn really_long_unicode_string() {
    let len = 500;
    let s = random_unicode_string(len);

    let mut r = Rope::from(s.as_str());
    check(&r, s.as_str());

    r.delete(1, len - 2);
}

#[test]
fn insert_bytes_rejects_invalid_utf8() {
    let mut r = Rope::new();
    assert!(r.insert_bytes(0, &[0xFF, 0xFE]).is_err());
    check(&r, "");

    r.insert_bytes(0, "ok".as_bytes()).unwrap();
    check(&r, "ok");
}

#[test]
fn clone_is_independent() {
    let mut r = Rope::from("original");
    let c = r.clone();
    r.insert(0, "not in clone: ");
    assert_eq!(c.to_string(), "original");
    assert_ne!(r, c);
}

#[test]
fn extend_appends_chunks() {
    let mut r = Rope::from("a");
    r.extend(["b", "c", "d"]);
    check(&r, "abcd");
}

#[test]
fn display_and_to_string_agree() {
    let r = Rope::from("hello world");
    assert_eq!(format!("{r}"), r.to_string());
}

#[test]
fn random_edits_stay_consistent() {
    let mut rng = rand::thread_rng();
    let mut r = Rope::new();
    let mut expected = String::new();

    for _ in 0..500 {
        if expected.is_empty() || rng.gen_bool(0.6) {
            let pos = rng.gen_range(0..=expected.chars().count());
            let s = random_ascii_string(rng.gen_range(1..8));
            let byte_pos = expected.char_indices().nth(pos).map(|(i, _)| i).unwrap_or(expected.len());
            expected.insert_str(byte_pos, &s);
            r.insert(pos, &s);
        } else {
            let char_len = expected.chars().count();
            let pos = rng.gen_range(0..char_len);
            let del_len = rng.gen_range(1..=(char_len - pos).min(5));
            let start = expected.char_indices().nth(pos).map(|(i, _)| i).unwrap();
            let end = expected.char_indices().nth(pos + del_len).map(|(i, _)| i).unwrap_or(expected.len());
            expected.replace_range(start..end, "");
            r.delete(pos, del_len);
        }
    }

    check(&r, &expected);
}
