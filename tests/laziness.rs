use ironseq::testing::*;
use ironseq::*;

#[test]
fn chaining_pulls_nothing() -> anyhow::Result<()> {
    let probe = ProbeSource::new(ints(&[3, 1, 2]));
    let chained = Collection::new(probe.clone())
        .map(|v, _| Value::from(v.as_i64().unwrap_or(0) + 1))
        .sort(SortMode::Values, None)
        .reverse()
        .window(1)?;
    let _ = chained.iter();
    assert_eq!(probe.pulls(), 0);
    assert_eq!(chained.count()?, 3);
    assert_eq!(probe.opens(), 2);
    Ok(())
}

#[test]
fn traversals_are_repeatable() -> anyhow::Result<()> {
    let c = Collection::from_iterable([5, 3, 9]).sort(SortMode::Values, None);
    assert_eq!(c.all()?, c.all()?);
    assert!(c.same(&c)?);
    Ok(())
}

#[test]
fn callable_sources_rerun_on_each_traversal() -> anyhow::Result<()> {
    let c = Collection::from_callable(|| (0..3).map(Value::from));
    assert_eq!(c.count()?, 3);
    assert_eq!(c.count()?, 3);
    Ok(())
}

#[test]
fn infinite_sources_are_fine_when_bounded() -> anyhow::Result<()> {
    let naturals = Collection::range(0.0, f64::INFINITY, 1.0);
    assert_eq!(naturals.limit(3, 2)?.all_values()?.len(), 3);
    let cycled = Collection::from_iterable([1, 2]).cycle().limit(5, 0)?;
    assert_values_equal(&cycled, &[1, 2, 1, 2, 1])?;
    assert!(naturals.contains([Value::float(10.0)])?);
    Ok(())
}

#[test]
fn early_termination_stops_pulling() -> anyhow::Result<()> {
    let probe = ProbeSource::new(ints(&[1, 2, 3, 4, 5, 6]));
    let c = Collection::new(probe.clone()).filter(vec![]).first();
    assert_eq!(c.current(0)?, Some(Value::from(1)));
    assert!(probe.pulls() < 6);
    Ok(())
}

#[test]
fn when_condition_is_checked_at_pull_time() -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let flag = Arc::new(AtomicBool::new(false));
    let probe = Arc::clone(&flag);
    let c = Collection::from_iterable([1, 2, 3]).when(
        Arc::new(move || probe.load(Ordering::SeqCst)),
        Pipe::default().then(ironseq::ops::Reverse),
        None,
    );
    assert_eq!(c.current(0)?, Some(Value::from(1)));
    flag.store(true, Ordering::SeqCst);
    assert_eq!(c.current(0)?, Some(Value::from(3)));
    Ok(())
}
