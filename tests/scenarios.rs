use ironseq::testing::*;
use ironseq::*;

#[test]
fn filter_keeps_keys_until_normalized() -> anyhow::Result<()> {
    let evens = Collection::from_iterable([1, 2, 3, 4])
        .filter_by(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
    assert_eq!(evens.all()?, Value::map([(1, 2), (3, 4)]));
    assert_eq!(evens.normalize().all()?, Value::list([2, 4]));
    Ok(())
}

#[test]
fn chunk_groups_values() -> anyhow::Result<()> {
    let chunks = Collection::from_iterable(["A", "B", "C"]).chunk(&[2]);
    assert_eq!(
        chunks.all()?,
        Value::list([Value::list(["A", "B"]), Value::list(["C"])])
    );
    Ok(())
}

#[test]
fn collatz_unfold_until_one() -> anyhow::Result<()> {
    let collatz = Collection::unfold(
        |params| {
            let n = params.first().and_then(Value::as_i64).unwrap_or(1);
            vec![Value::from(if n % 2 == 0 { n / 2 } else { n * 3 + 1 })]
        },
        vec![Value::from(10)],
    )
    .until(vec![predicate(|v, _| v.as_i64() == Some(1))]);
    assert_eq!(collatz.all()?, Value::list([5, 16, 8, 4, 2, 1]));
    Ok(())
}

#[test]
fn zip_pairs_keys_and_values() -> anyhow::Result<()> {
    let zipped = Collection::from_iterable([1, 2, 3]).zip([Collection::from_iterable([4, 5, 6])]);
    assert_entries_equal(
        &zipped,
        &[
            kv(Value::list([0, 0]), Value::list([1, 4])),
            kv(Value::list([1, 1]), Value::list([2, 5])),
            kv(Value::list([2, 2]), Value::list([3, 6])),
        ],
    )?;
    Ok(())
}

#[test]
fn range_is_half_open_and_float_typed() -> anyhow::Result<()> {
    let r = Collection::range(0.0, 5.0, 1.0);
    assert_eq!(
        r.all()?,
        Value::list([0.0, 1.0, 2.0, 3.0, 4.0].map(Value::float))
    );
    Ok(())
}

#[test]
fn window_accumulates_trailing_values() -> anyhow::Result<()> {
    let w = Collection::from_iterable(["a", "b", "c"]).window(2)?;
    assert_eq!(
        w.all()?,
        Value::list([
            Value::list(["a"]),
            Value::list(["a", "b"]),
            Value::list(["a", "b", "c"]),
        ])
    );
    Ok(())
}

#[test]
fn word_frequencies_from_text() -> anyhow::Result<()> {
    let text = Collection::from_string("the cat and the hat", None);
    let freq = text.words().frequency();
    assert_entries_equal(
        &freq,
        &[kv(2, "the"), kv(1, "cat"), kv(1, "and"), kv(1, "hat")],
    )?;
    Ok(())
}

#[test]
fn group_records_by_column() -> anyhow::Result<()> {
    let people = Collection::from_iterable(sample_people());
    let by_team = people
        .group_by(Some(callback(|v, _| v.pluck(&Value::from("team"), &Value::Null))))
        .map(|group, _| Value::from(group.len()));
    assert_eq!(by_team.all()?, Value::map([("eng", 2), ("ops", 1)]));
    assert_values_equal(&people.column("name"), &["ada", "grace", "linus"])?;
    Ok(())
}
