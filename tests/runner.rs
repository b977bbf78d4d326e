use ironseq::*;

fn square(v: &Value, _: &Value) -> Value {
    let n = v.as_i64().unwrap_or(0);
    Value::from(n * n)
}

#[test]
fn parallel_map_preserves_order() -> anyhow::Result<()> {
    let c = Collection::from_iterable(0..1000)
        .with_runner(Runner::parallel(Some(4)).with_batch(7))
        .async_map(square);
    let expected: Vec<Value> = (0..1000i64).map(|n| Value::from(n * n)).collect();
    assert_eq!(c.all_values()?, expected);
    Ok(())
}

#[test]
fn sequential_and_parallel_agree() -> anyhow::Result<()> {
    let base = Collection::from_entries((0..50).map(|i| (format!("k{i}"), i)));
    let seq = base.with_runner(Runner::sequential()).async_map(square);
    let par = base.with_runner(Runner::parallel(None)).async_map(square);
    assert!(seq.same(&par)?);
    assert_eq!(seq.key(3)?, Some(Value::from("k3")));
    Ok(())
}

#[test]
fn async_map_n_applies_callbacks_in_order() -> anyhow::Result<()> {
    let inc = callback(|v, _| Value::from(v.as_i64().unwrap_or(0) + 1));
    let dbl = callback(|v, _| Value::from(v.as_i64().unwrap_or(0) * 2));
    let c = Collection::from_iterable([1, 2]).async_map_n(vec![inc, dbl]);
    assert_eq!(c.all()?, Value::list([4, 6]));
    Ok(())
}

#[test]
fn parallel_callback_errors_still_propagate() {
    let c = Collection::from_iterable(0..20)
        .with_runner(Runner::parallel(Some(2)).with_batch(4))
        .async_map_n(vec![try_callback(|v, _| {
            if v.as_i64() == Some(13) {
                anyhow::bail!("unlucky");
            }
            Ok(v.clone())
        })]);
    assert!(c.all().is_err_and(|e| e.is_callback()));
}
