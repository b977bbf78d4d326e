use ironseq::*;

#[derive(Debug)]
struct Boom(i64);

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom at {}", self.0)
    }
}

impl std::error::Error for Boom {}

#[test]
fn invalid_parameters_fail_at_chain_time() {
    let c = Collection::from_iterable([1, 2, 3]);
    assert!(c.window(-2).is_err_and(|e| e.is_configuration()));
    assert!(c.intersperse("x", 0, 0).is_err_and(|e| e.is_configuration()));
    assert!(c.intersperse("x", 1, -1).is_err_and(|e| e.is_configuration()));
    assert!(c.rsample(1.5, 0).is_err_and(|e| e.is_configuration()));
    assert!(c.limit(-3, 0).is_err_and(|e| e.is_configuration()));
    assert!(c.random(-1, 0).is_err_and(|e| e.is_configuration()));
    assert!("sideways".parse::<SortMode>().is_err());
}

#[test]
fn callback_errors_propagate_unchanged() {
    let c = Collection::from_iterable([1, 2, 3]).try_map(|v, _| {
        let n = v.as_i64().unwrap_or(0);
        if n == 2 {
            return Err(Boom(n).into());
        }
        Ok(v.clone())
    });
    let err = c.all().err();
    let boom = err
        .as_ref()
        .and_then(Error::callback_error)
        .and_then(|e| e.downcast_ref::<Boom>());
    assert_eq!(boom.map(|b| b.0), Some(2));
}

#[test]
fn squash_keeps_the_entries_that_succeeded() -> anyhow::Result<()> {
    let c = Collection::from_iterable([1, 2, 3])
        .try_map(|v, _| {
            if v.as_i64() == Some(2) {
                anyhow::bail!("no twos");
            }
            Ok(v.clone())
        })
        .squash();
    assert_eq!(c.all_values()?, vec![Value::from(1), Value::from(3)]);
    Ok(())
}

#[test]
fn bounds_errors_surface_on_pull() -> anyhow::Result<()> {
    let c = Collection::from_iterable([1, 2, 3]);
    let zero = c.limit(0, 0)?;
    assert!(matches!(zero.count(), Err(Error::Bounds { .. })));
    let too_many = c.random(5, 1)?;
    assert!(matches!(too_many.all(), Err(Error::Bounds { .. })));
    Ok(())
}

#[test]
fn strict_reports_the_offending_type() {
    let c = Collection::from_iterable([Value::from(1), Value::from("two")]).strict(None);
    match c.all() {
        Err(Error::Type { expected, found }) => {
            assert_eq!(expected, "int");
            assert_eq!(found, "string");
        }
        other => panic!("expected a type error, got {other:?}"),
    }
}

#[test]
fn missing_files_fail_at_first_pull_not_construction() {
    let c = Collection::from_file("/definitely/not/here.txt").lines();
    assert!(matches!(c.count(), Err(Error::Resource { .. })));
}
