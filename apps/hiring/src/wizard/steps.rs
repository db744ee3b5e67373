//! Stock step-completion predicates and the `Loadable` wrapper for data a step
//! fetches on entry. Data that is still loading never satisfies a predicate.

use std::hash::Hash;

use crate::selection::SelectionState;

/// Remote data owned by a step.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Loadable<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => Loadable::Failed(e.to_string()),
        }
    }
}

/// "A job is selected": the field is non-null.
pub fn value_selected<P, T, G>(get: G) -> impl Fn(&P) -> bool + Send + Sync + 'static
where
    G: Fn(&P) -> &Option<T> + Send + Sync + 'static,
{
    move |payload| get(payload).is_some()
}

/// "At least one item is selected".
pub fn at_least_one<P, K, G>(get: G) -> impl Fn(&P) -> bool + Send + Sync + 'static
where
    K: Clone + Eq + Hash,
    G: Fn(&P) -> &SelectionState<K> + Send + Sync + 'static,
{
    move |payload| get(payload).count() > 0
}

/// "Free-text content is non-empty after trimming".
pub fn non_blank<P, G>(get: G) -> impl Fn(&P) -> bool + Send + Sync + 'static
where
    G: Fn(&P) -> &str + Send + Sync + 'static,
{
    move |payload| !get(payload).trim().is_empty()
}

/// Guards `inner` behind step data that must have finished loading.
pub fn loaded_and<P, T, G, F>(get: G, inner: F) -> impl Fn(&P) -> bool + Send + Sync + 'static
where
    G: Fn(&P) -> &Loadable<T> + Send + Sync + 'static,
    F: Fn(&P) -> bool + Send + Sync + 'static,
{
    move |payload| get(payload).ready().is_some() && inner(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Payload {
        job: Option<u32>,
        rows: Loadable<Vec<u32>>,
        picked: SelectionState<u32>,
        text: String,
    }

    #[test]
    fn test_value_selected() {
        let check = value_selected(|p: &Payload| &p.job);
        let mut payload = Payload::default();
        assert!(!check(&payload));
        payload.job = Some(7);
        assert!(check(&payload));
    }

    #[test]
    fn test_non_blank_trims() {
        let check = non_blank(|p: &Payload| p.text.as_str());
        let mut payload = Payload::default();
        payload.text = " \n\t".to_string();
        assert!(!check(&payload));
        payload.text = " agenda ".to_string();
        assert!(check(&payload));
    }

    #[test]
    fn test_loading_data_is_incomplete() {
        let check = loaded_and(
            |p: &Payload| &p.rows,
            at_least_one(|p: &Payload| &p.picked),
        );
        let mut payload = Payload::default();
        payload.picked.set_universe([1, 2]);
        payload.picked.select(1);

        payload.rows = Loadable::Loading;
        assert!(!check(&payload));

        payload.rows = Loadable::Failed("boom".to_string());
        assert!(!check(&payload));

        payload.rows = Loadable::Ready(vec![1, 2]);
        assert!(check(&payload));
    }

    #[test]
    fn test_loadable_from_result() {
        let ok: Loadable<u32> = Ok::<_, String>(3).into();
        assert_eq!(ok.ready(), Some(&3));
        let failed: Loadable<u32> = Err::<u32, _>("nope").into();
        assert_eq!(failed.error(), Some("nope"));
        assert!(Loadable::<u32>::Loading.is_loading());
    }
}
