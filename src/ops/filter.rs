//! Entry-dropping stages. Keys are always preserved.

use super::on_entry;
use crate::operation::{Operation, Predicate, any_of};
use crate::sequence::Sequence;
use crate::value::Value;
use std::sync::Arc;

/// Keep entries for which at least one predicate holds. Without predicates,
/// keep truthy values.
pub struct Filter {
    predicates: Arc<Vec<Predicate>>,
}

impl Filter {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates: Arc::new(predicates),
        }
    }
}

impl Operation for Filter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let preds = Arc::clone(&self.predicates);
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| Ok(any_of(&preds, &v, &k)?.then_some((k, v))))
        }))
    }
}

/// Complement of [`Filter`]: drop entries for which any predicate holds.
pub struct Reject {
    predicates: Arc<Vec<Predicate>>,
}

impl Reject {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates: Arc::new(predicates),
        }
    }
}

impl Operation for Reject {
    fn name(&self) -> &'static str {
        "reject"
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let preds = Arc::clone(&self.predicates);
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| Ok((!any_of(&preds, &v, &k)?).then_some((k, v))))
        }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Key,
    Value,
}

/// Keep (or drop) entries whose key or value is one of a fixed set.
///
/// Backs `diff`, `diff_keys`, `intersect`, `intersect_keys` and `forget`.
pub struct Membership {
    name: &'static str,
    side: Side,
    set: Arc<Vec<Value>>,
    keep_members: bool,
}

impl Membership {
    pub fn diff(values: Vec<Value>) -> Self {
        Self::build("diff", Side::Value, values, false)
    }

    pub fn diff_keys(keys: Vec<Value>) -> Self {
        Self::build("diff_keys", Side::Key, keys, false)
    }

    pub fn intersect(values: Vec<Value>) -> Self {
        Self::build("intersect", Side::Value, values, true)
    }

    pub fn intersect_keys(keys: Vec<Value>) -> Self {
        Self::build("intersect_keys", Side::Key, keys, true)
    }

    pub fn forget(keys: Vec<Value>) -> Self {
        Self::build("forget", Side::Key, keys, false)
    }

    fn build(name: &'static str, side: Side, set: Vec<Value>, keep_members: bool) -> Self {
        Self {
            name,
            side,
            set: Arc::new(set),
            keep_members,
        }
    }
}

impl Operation for Membership {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, input: Sequence) -> Sequence {
        let set = Arc::clone(&self.set);
        let (side, keep) = (self.side, self.keep_members);
        Box::new(input.filter_map(move |item| {
            on_entry(item, |(k, v)| {
                let probe = match side {
                    Side::Key => &k,
                    Side::Value => &v,
                };
                Ok((set.contains(probe) == keep).then_some((k, v)))
            })
        }))
    }
}

/// Drop entries whose value is in `values`, or every falsy value by default.
pub fn compact(values: Option<Vec<Value>>) -> Arc<dyn Operation> {
    match values {
        Some(values) => Arc::new(Membership::build("compact", Side::Value, values, false)),
        None => Arc::new(Filter::new(Vec::new())),
    }
}
