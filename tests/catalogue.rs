use ironseq::testing::*;
use ironseq::*;
use std::sync::{Arc, Mutex};

fn below(n: i64) -> Predicate {
    predicate(move |v, _| v.as_i64().is_some_and(|x| x < n))
}

fn numbers() -> Collection {
    Collection::from_iterable([1, 2, 3, 4])
}

#[test]
fn adding_values() -> anyhow::Result<()> {
    assert_values_equal(&numbers().append([5]).prepend([0]), &[0, 1, 2, 3, 4, 5])?;
    assert_values_equal(&Collection::from_iterable(["a", "b"]).intersperse("-", 1, 0)?, &["-", "a", "-", "b"])?;
    assert_eq!(Collection::from_iterable([1]).pad(3, 0).count()?, 3);
    Ok(())
}

#[test]
fn head_tail_and_positions() -> anyhow::Result<()> {
    let c = numbers();
    assert_values_equal(&c.head(), &[1])?;
    assert_values_equal(&c.tail(), &[2, 3, 4])?;
    assert_values_equal(&c.init(), &[1, 2, 3])?;
    assert_values_equal(&c.last(), &[4])?;
    assert_values_equal(&c.slice(1, Some(2)), &[2, 3])?;
    assert_values_equal(&c.skip(&[1, 1]), &[3, 4])?;
    assert_values_equal(&c.nth(2, 0)?, &[1, 3])?;
    assert_values_equal(&c.get(2, "none"), &[3])?;
    assert_values_equal(&c.keys(), &[0, 1, 2, 3])?;
    Ok(())
}

#[test]
fn boundaries() -> anyhow::Result<()> {
    let c = Collection::from_iterable([1, 2, 5, 1]);
    assert_values_equal(&c.take_while(vec![below(3)]), &[1, 2])?;
    assert_values_equal(&c.drop_while(vec![below(3)]), &[5, 1])?;
    assert_values_equal(&c.since(vec![predicate(|v, _| v.as_i64() == Some(5))]), &[5, 1])?;
    let span = c.span(vec![below(3)]).all_values()?;
    assert_eq!(span.len(), 2);
    assert_eq!(span[0], Value::list([1, 2]));
    assert_eq!(span[1].values(), Some(vec![Value::from(5), Value::from(1)]));
    Ok(())
}

#[test]
fn partitions_keep_original_keys() -> anyhow::Result<()> {
    let even = predicate(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
    let buckets = numbers().partition(vec![even]).all_values()?;
    assert_eq!(buckets, vec![Value::map([(1, 2), (3, 4)]), Value::map([(0, 1), (2, 3)])]);
    Ok(())
}

#[test]
fn set_like_selection() -> anyhow::Result<()> {
    let c = numbers();
    assert_values_equal(&c.diff([2, 4]), &[1, 3])?;
    assert_values_equal(&c.intersect([2, 4, 9]), &[2, 4])?;
    assert_values_equal(&c.diff_keys([0]), &[2, 3, 4])?;
    assert_values_equal(&c.intersect_keys([0, 3]), &[1, 4])?;
    assert_values_equal(&c.forget([1, 2]), &[1, 4])?;
    let words = Collection::from_iterable(["a", "A", "b", "a"]);
    assert_values_equal(&words.distinct(), &["a", "A", "b"])?;
    assert_values_equal(&words.duplicate(), &["a"])?;
    let lower = callback(|v, _| Value::from(v.to_string().to_lowercase()));
    assert_values_equal(&words.distinct_by(None, Some(lower)), &["a", "b"])?;
    Ok(())
}

#[test]
fn truthiness_filters() -> anyhow::Result<()> {
    let mixed = Collection::from_iterable([Value::Null, 0.into(), "x".into(), "".into(), 7.into()]);
    assert_values_equal(&mixed.compact(None), &["x".into(), Value::from(7)])?;
    assert_values_equal(&mixed.compact(Some(vec![Value::Null])).normalize(), &[Value::from(0), "x".into(), "".into(), 7.into()])?;
    assert_values_equal(&mixed.coalesce(), &["x"])?;
    Ok(())
}

#[test]
fn reshaping_keys_and_values() -> anyhow::Result<()> {
    let letters = Collection::from_iterable(["a", "b", "c"]);
    assert_entries_equal(&letters.flip(), &[kv("a", 0), kv("b", 1), kv("c", 2)])?;
    assert_entries_equal(&letters.combine(["x", "y", "z"]), &[kv("x", "a"), kv("y", "b"), kv("z", "c")])?;
    assert_entries_equal(&letters.pair(), &[kv("a", "b"), kv("c", Value::Null)])?;
    assert_entries_equal(&letters.pair().unpair().normalize().first(), &[kv(0, "a")])?;
    assert_values_equal(&letters.pack().first(), &[Value::list([Value::from(0), "a".into()])])?;
    assert!(letters.pack().unpack().same(&letters)?);
    let upper = callback(|v, _| Value::from(v.to_string().to_uppercase()));
    let keyed = letters.associate(Some(callback(|k, _| Value::from(format!("k{k}")))), Some(upper));
    assert_entries_equal(&keyed.first(), &[kv("k0", "A")])?;
    Ok(())
}

#[test]
fn conditional_and_multi_stage_maps() -> anyhow::Result<()> {
    let c = numbers().if_then_else(
        below(3),
        callback(|v, _| Value::from(v.as_i64().unwrap_or(0) * 10)),
        None,
    );
    assert_values_equal(&c, &[10, 20, 3, 4])?;
    let inc = callback(|v, _| Value::from(v.as_i64().unwrap_or(0) + 1));
    assert_values_equal(&numbers().map_n(vec![inc.clone(), inc]), &[3, 4, 5, 6])?;
    let dup = numbers().flat_map(|v, _| Value::list([v.clone(), v.clone()]));
    assert_eq!(dup.count()?, 8);
    Ok(())
}

#[test]
fn nested_data() -> anyhow::Result<()> {
    let nested = Collection::from_iterable([Value::list([1, 2]), Value::list([Value::from(3), Value::list([4])])]);
    assert_values_equal(&nested.flatten(None), &[1, 2, 3, 4])?;
    assert_eq!(nested.flatten(Some(1)).count()?, 4);
    assert_values_equal(&nested.collapse(), &[Value::from(1), 2.into(), 3.into(), Value::list([4])])?;
    let people = Collection::from_iterable(sample_people());
    assert_values_equal(&people.pluck("age", 0), &[36, 45, 28])?;
    let table = Collection::from_value(Value::list([Value::list(sample_people())]));
    assert_values_equal(&table.pluck("*.name", Value::Null), &[Value::list(["ada", "grace", "linus"])])?;
    let rows = Collection::from_iterable([Value::list([1, 2]), Value::list([3, 4])]);
    assert_values_equal(&rows.unzip(), &[Value::list([1, 3]), Value::list([2, 4])])?;
    assert_values_equal(&rows.transpose(), &[Value::list([1, 3]), Value::list([2, 4])])?;
    Ok(())
}

#[test]
fn splitting_text() -> anyhow::Result<()> {
    let csv = Collection::from_string("a,b,,c", Some(","));
    assert_values_equal(&csv, &["a", "b", "", "c"])?;
    let chars = Collection::from_string("ab|cd", None).explode(["|"]);
    assert_eq!(chars.count()?, 2);
    let split = Collection::from_iterable([1, 2, 3, 4, 5]).split(SplitMode::After, vec![predicate(|v, _| v.as_i64() == Some(2))]);
    assert_values_equal(&split, &[Value::list([1, 2]), Value::list([3, 4, 5])])?;
    assert_eq!(Collection::from_string("x\ny", None).lines().unlines()?, "x\ny");
    Ok(())
}

#[test]
fn prefixes_suffixes_and_windows() -> anyhow::Result<()> {
    let c = Collection::from_iterable([1, 2]);
    assert_values_equal(&c.tails(), &[Value::list([1, 2]), Value::list([2]), Value::List(vec![])])?;
    assert_eq!(c.inits().count()?, 3);
    assert!(c.window(3)?.unwindow().same(&c)?);
    assert_eq!(c.window(-1)?.last().current(0)?, Some(Value::list([1, 2])));
    Ok(())
}

#[test]
fn grouping() -> anyhow::Result<()> {
    let runs = Collection::from_iterable([1, 1, 2, 1]).group();
    assert_values_equal(&runs, &[Value::list([1, 1]), Value::list([2]), Value::list([1])])?;
    let by_key = Collection::from_entries([("a", 1), ("b", 2), ("a", 3)]).group_by(None);
    assert_eq!(by_key.all()?, Value::map([("a", Value::list([1, 3])), ("b", Value::list([2]))]));
    Ok(())
}

#[test]
fn combinatorics() -> anyhow::Result<()> {
    let abc = Collection::from_iterable(["a", "b", "c"]);
    assert_eq!(abc.combinate(Some(2)).count()?, 3);
    assert_eq!(abc.permutate().count()?, 6);
    assert_eq!(abc.product([Collection::from_iterable([1, 2])]).count()?, 6);
    Ok(())
}

#[test]
fn sorting() -> anyhow::Result<()> {
    let c = Collection::from_entries([("b", 1), ("a", 3), ("c", 2)]);
    assert_values_equal(&c.sort(SortMode::Values, None), &[1, 2, 3])?;
    assert_values_equal(&c.sort(SortMode::Keys, None), &[3, 1, 2])?;
    let desc = comparator(|a, b| b.compare(a));
    assert_values_equal(&c.sort("values".parse()?, Some(desc)), &[3, 2, 1])?;
    assert_values_equal(&c.reverse(), &[2, 3, 1])?;
    Ok(())
}

#[test]
fn seeded_randomness_is_reproducible() -> anyhow::Result<()> {
    let c = Collection::from_iterable(0..50);
    assert!(c.shuffle(9).same(&c.shuffle(9))?);
    assert_values_unordered_equal(&c.shuffle(9), &(0..50).collect::<Vec<i32>>())?;
    assert_eq!(c.random(5, 3)?.count()?, 5);
    assert!(c.rsample(0.5, 4)?.same(&c.rsample(0.5, 4)?)?);
    Ok(())
}

#[test]
fn scaling() -> anyhow::Result<()> {
    let c = Collection::from_iterable([0, 5, 10, 20]).scale(0.0, 10.0, 0.0, 1.0, None)?;
    assert_values_equal(&c, &[0.0, 0.5, 1.0])?;
    Ok(())
}

#[test]
fn side_effects_and_dumps() -> anyhow::Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_store = Arc::clone(&seen);
    let sink: DumpSink = Arc::new(move |label: &str, _: &Value, v: &Value| {
        if let Ok(mut s) = sink_store.lock() {
            s.push(format!("{label}={v}"));
        }
    });
    let counter = Arc::new(Mutex::new(0));
    let tick = Arc::clone(&counter);
    let c = numbers()
        .dump("in", 2, Some(sink))
        .apply(vec![predicate(move |_, _| {
            if let Ok(mut n) = tick.lock() {
                *n += 1;
            }
            true
        })]);
    assert_eq!(c.count()?, 4);
    assert_eq!(seen.lock().map(|s| s.clone()).unwrap_or_default(), vec!["in=1", "in=2"]);
    assert_eq!(counter.lock().map(|n| *n).unwrap_or(0), 4);
    Ok(())
}

#[test]
fn cache_replays_without_touching_the_source() -> anyhow::Result<()> {
    let probe = ProbeSource::new(ints(&[1, 2, 3]));
    let store = MemoryCache::new();
    let cached = Collection::new(probe.clone()).cache(Arc::new(store.clone()));
    assert_eq!(cached.all()?, cached.all()?);
    assert_eq!(probe.pulls(), 3);
    assert_eq!(store.len()?, 4);
    Ok(())
}

#[test]
fn generated_sources() -> anyhow::Result<()> {
    assert_values_equal(&Collection::times(3, None), &[1, 2, 3])?;
    let squares = Collection::times(3, Some(callback(|v, _| Value::from(v.as_i64().unwrap_or(0).pow(2)))));
    assert_values_equal(&squares, &[1, 4, 9])?;
    assert!(Collection::empty().is_empty()?);
    let fib = Collection::unfold(
        |p| {
            let (a, b) = (p[0].as_i64().unwrap_or(0), p[1].as_i64().unwrap_or(0));
            vec![Value::from(b), Value::from(a + b)]
        },
        vec![Value::from(0), Value::from(1)],
    )
    .pluck(0, Value::Null)
    .limit(5, 0)?;
    assert_values_equal(&fib, &[1, 1, 2, 3, 5])?;
    Ok(())
}

#[test]
fn terminal_queries() -> anyhow::Result<()> {
    let c = numbers();
    assert_eq!(c.find(Value::Null, &[predicate(|v, _| v.as_i64() > Some(2))])?, Value::from(3));
    assert!(c.has(&[callback(|_, _| Value::from(4))])?);
    assert!(c.every(&[below(5)])?);
    assert!(c.truthy()?);
    assert!(c.contains([1, 4])?);
    assert!(c.equals(&c.reverse())?);
    assert!(!c.same(&c.reverse())?);
    assert_eq!(c.implode("+")?, "1+2+3+4");
    Ok(())
}
