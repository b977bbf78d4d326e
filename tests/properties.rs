use ironseq::*;
use proptest::prelude::*;

fn collection(values: &[i64]) -> Collection {
    Collection::from_iterable(values.iter().copied())
}

proptest! {
    #[test]
    fn normalize_is_idempotent(values in prop::collection::vec(-50i64..50, 0..40)) {
        let once = collection(&values).filter_by(|v, _| v.as_i64().is_some_and(|n| n > 0)).normalize();
        prop_assert_eq!(once.all()?, once.normalize().all()?);
    }

    #[test]
    fn windows_never_exceed_size_plus_one(values in prop::collection::vec(any::<i64>(), 0..30), size in 0i64..6) {
        let windows = collection(&values).window(size)?;
        for w in windows.all_values()? {
            prop_assert!(w.len() <= usize::try_from(size + 1).unwrap_or(usize::MAX));
        }
        prop_assert_eq!(windows.count()?, values.len());
    }

    #[test]
    fn filter_and_reject_partition_the_input(values in prop::collection::vec(-100i64..100, 0..50)) {
        let even = predicate(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0));
        let c = collection(&values);
        let kept = c.filter(vec![even.clone()]).entries()?;
        let dropped = c.reject(vec![even]).entries()?;
        prop_assert_eq!(kept.len() + dropped.len(), values.len());
        let mut merged: Vec<_> = kept.into_iter().chain(dropped).collect();
        merged.sort_by(|a, b| a.0.compare(&b.0));
        prop_assert_eq!(merged, c.entries()?);
    }

    #[test]
    fn flip_twice_restores_entries(values in prop::collection::vec("[a-z]{0,4}", 0..20)) {
        let c = Collection::from_iterable(values.clone());
        prop_assert!(c.flip().flip().same(&c)?);
    }

    #[test]
    fn wrap_then_unwrap_restores_entries(values in prop::collection::vec(any::<i32>(), 0..20)) {
        let c = Collection::from_iterable(values.clone()).reverse();
        prop_assert!(c.wrap().unwrap().same(&c)?);
    }
}
