use std::io::Write;
use tempfile::NamedTempFile;
use v2txt::{DefaultV2Txt, Entry, TokenGenerator, TokenValue, V2Txt};

fn generator_from_file(data: &[u8]) -> TokenGenerator {
    let mut file = NamedTempFile::new().expect("TempFile");
    file.write_all(data).expect("Write");
    let tokens = DefaultV2Txt::open_txt(file.path()).expect("Tokenize");
    TokenGenerator::new(tokens)
}

#[test]
fn test_windows_1252_is_decoded() {
    // 0xE9 is 'é' in WINDOWS_1252
    let mut tg = generator_from_file(b"FRA = \"Fran\xE7aise\" REU = \"R\xE9union\"");
    match tg.next_entry() {
        Some(Ok(Entry::KeyValue { key, value, .. })) => {
            assert_eq!(key, "FRA");
            assert_eq!(value, TokenValue::Str("Française".to_string()));
        }
        other => panic!("unexpected entry {:?}", other),
    }
    match tg.next_entry() {
        Some(Ok(Entry::KeyValue { value, .. })) => {
            assert_eq!(value.as_str(), Some("Réunion"));
        }
        other => panic!("unexpected entry {:?}", other),
    }
}

#[test]
fn test_loose_values_in_list() {
    let mut tg = generator_from_file(b"dreadnought = { \"Marengo\" Jena 1805 }");
    assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
    let mut names = Vec::new();
    while let Some(entry) = tg.next_entry() {
        if let Ok(Entry::Value { value, .. }) = entry {
            names.push(value.to_text());
        }
    }
    assert_eq!(names, vec!["Marengo", "Jena", "1805"]);
}

#[test]
fn test_capture_and_replay_span() {
    let mut tg = TokenGenerator::from_text(
        "first = {\n  icon = 2\n  trigger = { war = yes }\n}\nsecond = { icon = 3 }",
    );
    assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
    let span = tg.capture_group();
    assert_eq!(span.line(), 2);

    // the outer walk continues after the captured block
    match tg.next_entry() {
        Some(Ok(Entry::KeyGroup { key, .. })) => assert_eq!(key, "second"),
        other => panic!("unexpected entry {:?}", other),
    }

    let mut replay = TokenGenerator::from_span(&span);
    match replay.next_entry() {
        Some(Ok(Entry::KeyValue { key, value, line })) => {
            assert_eq!(key, "icon");
            assert_eq!(value.as_i32(), Some(2));
            assert_eq!(line, 2);
        }
        other => panic!("unexpected entry {:?}", other),
    }
    assert!(matches!(replay.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
    replay.discard_group();
    assert!(replay.next_entry().is_none());
}

#[test]
fn test_stray_closing_brace_is_reported_and_skipped() {
    let mut tg = TokenGenerator::from_text("a = 1 } b = 2");
    assert!(matches!(tg.next_entry(), Some(Ok(_))));
    assert!(matches!(tg.next_entry(), Some(Err(_))));
    assert!(matches!(
        tg.next_entry(),
        Some(Ok(Entry::KeyValue { ref key, .. })) if key == "b"
    ));
}
