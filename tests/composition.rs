use ironseq::ops::{Filter, Map, Normalize, Reverse};
use ironseq::*;
use std::sync::Arc;

fn double() -> Arc<dyn Operation> {
    Arc::new(Map::new(vec![callback(|v, _| Value::from(v.as_i64().unwrap_or(0) * 2))]))
}

fn big() -> Arc<dyn Operation> {
    Arc::new(Filter::new(vec![predicate(|v, _| v.as_i64().is_some_and(|n| n > 4))]))
}

#[test]
fn pipe_is_associative() -> anyhow::Result<()> {
    let source = Collection::from_iterable([1, 2, 3, 4]);
    let normalize: Arc<dyn Operation> = Arc::new(Normalize);
    let left = source.pipe(vec![
        Arc::new(Pipe::new(vec![double(), big()])) as Arc<dyn Operation>,
        Arc::clone(&normalize),
    ]);
    let right = source.pipe(vec![
        double(),
        Arc::new(Pipe::new(vec![big(), normalize])) as Arc<dyn Operation>,
    ]);
    assert!(left.same(&right)?);
    assert_eq!(left.all()?, Value::list([6, 8]));
    Ok(())
}

#[test]
fn stored_pipes_are_reusable() -> anyhow::Result<()> {
    let stage = Pipe::default().then(Reverse).then(Normalize);
    let a = Collection::from_iterable([1, 2]).then(stage.clone());
    let b = Collection::from_iterable(["x", "y"]).then(stage);
    assert_eq!(a.all()?, Value::list([2, 1]));
    assert_eq!(b.all()?, Value::list(["y", "x"]));
    Ok(())
}

#[test]
fn explain_lists_stages_and_marks_buffering() {
    let c = Collection::from_iterable([1, 2])
        .map(|v, _| v.clone())
        .sort(SortMode::Values, None)
        .keys();
    let plan = c.explain();
    let names: Vec<&str> = plan.steps.iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["map", "sort", "keys"]);
    assert_eq!(plan.buffering_stages(), 1);
    assert!(plan.to_string().contains("sort (BUFFERING)"));
}

#[test]
fn collections_feed_merge_product_and_zip() -> anyhow::Result<()> {
    let a = Collection::from_iterable([1, 2]);
    let b = Collection::from_iterable([3]);
    assert_eq!(a.merge([b.clone()]).all()?, Value::list([1, 2, 3]));
    assert_eq!(a.product([b]).count()?, 2);
    Ok(())
}

#[test]
fn folds_and_scans() -> anyhow::Result<()> {
    let sub = reducer(|acc, v, _| Value::from(acc.as_i64().unwrap_or(0) - v.as_i64().unwrap_or(0)));
    let c = Collection::from_iterable([1, 2, 3]);
    assert_eq!(c.fold_left(sub.clone(), 0).current(0)?, Some(Value::from(-6)));
    assert_eq!(c.fold_right(sub.clone(), 0).current(0)?, Some(Value::from(-6)));
    assert_eq!(c.scan_left(sub.clone(), 0).all_values()?, vec![Value::from(0), (-1).into(), (-3).into(), (-6).into()]);
    assert_eq!(c.reduction(sub.clone(), 0).all_values()?.len(), 3);
    assert_eq!(c.reduce(&sub, None)?, Value::from(-4));
    Ok(())
}
