use ironseq::io::ByteSource;
use ironseq::testing::*;
use ironseq::*;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::Ordering;

#[test]
fn file_lines_are_reread_on_every_traversal() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "héllo\nworld\n")?;
    let lines = Collection::from_file(file.path()).lines();
    assert_values_equal(&lines, &["héllo", "world"])?;
    assert_eq!(lines.count()?, 2);
    Ok(())
}

#[test]
fn words_from_a_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "one two\tthree")?;
    let words = Collection::from_file(file.path()).words().normalize();
    assert_values_equal(&words, &["one", "two", "three"])?;
    assert_eq!(words.unwords()?, "one two three");
    Ok(())
}

#[test]
fn readers_can_only_be_consumed_once() -> anyhow::Result<()> {
    let c = Collection::from_reader("stdin-like", std::io::Cursor::new(b"ab".to_vec()));
    assert_eq!(c.implode("")?, "ab");
    assert!(matches!(c.count(), Err(Error::Resource { .. })));
    Ok(())
}

#[test]
fn squash_gives_a_partial_result_on_invalid_bytes() -> anyhow::Result<()> {
    let bytes = vec![b'a', b'b', 0xFF, b'c'];
    let strict = Collection::from_reader("mem", std::io::Cursor::new(bytes.clone()));
    assert!(matches!(strict.count(), Err(Error::Resource { .. })));

    let squashed = Collection::from_reader("mem", std::io::Cursor::new(bytes)).squash();
    assert_eq!(squashed.all_values()?, vec![Value::from("a"), Value::from("b")]);
    Ok(())
}

#[test]
fn failing_resources_are_closed() {
    let source = FailingByteSource::new(b"ab");
    let closed = source.close_counter();
    let slot = Mutex::new(Some(source));
    let c = Collection::from_resource("flaky", move || {
        slot.lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|s| Box::new(s) as Box<dyn ByteSource>)
            .ok_or(Error::Resource {
                message: "flaky already used".to_string(),
                source: None,
            })
    });
    assert!(c.all().is_err());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn first_character_of_a_large_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "{}", "x".repeat(10_000))?;
    let first = Collection::from_file(file.path()).first();
    assert_eq!(first.implode("")?, "x");
    Ok(())
}

#[test]
fn export_as_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out/teams.json");
    let c = Collection::from_entries([("eng", 2), ("ops", 1)]);
    c.write_json(&path)?;
    let back: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(back, serde_json::json!({"eng": 2, "ops": 1}));
    assert_eq!(Collection::from_iterable([1, 2]).to_json_string()?, "[1,2]");
    Ok(())
}
