//! Text splitting over character sequences, as produced by string and
//! resource sources.

use crate::operation::{callback, predicate};
use crate::ops::chunk::explode;
use crate::ops::filter::Filter;
use crate::ops::map::Map;
use crate::pipeline::Pipe;
use crate::value::Value;

fn join_chars() -> Map {
    Map::new(vec![callback(|v, _| {
        let text: String = v
            .values()
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect();
        Value::Str(text)
    })])
}

/// Words separated by spaces, tabs or newlines. Empty words are dropped
/// and the surviving ones keep the position they had among all segments.
pub fn words() -> Pipe {
    Pipe::default()
        .then(explode(vec![" ".into(), "\t".into(), "\n".into()]))
        .then(join_chars())
        .then(Filter::new(vec![predicate(|v, _| v.as_str().is_some_and(|s| !s.is_empty()))]))
}

/// Lines separated by `\n`. Empty lines are kept.
pub fn lines() -> Pipe {
    Pipe::default().then(explode(vec!["\n".into()])).then(join_chars())
}
