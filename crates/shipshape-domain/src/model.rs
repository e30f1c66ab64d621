use std::any::Any;
use std::collections::BTreeMap;
use std::collections::btree_map;

use shipshape_types::CheckType;

use crate::check::{Check, MergeError};
use crate::invalid::InvalidCheck;

type Bucket = Vec<Box<dyn Check>>;

/// Checks grouped by type tag.
///
/// Within a bucket the order is the order checks were first seen; named
/// checks are unique per bucket once maps have been combined with
/// [`CheckMap::merge`].
#[derive(Debug, Default)]
pub struct CheckMap(BTreeMap<CheckType, Bucket>);

impl CheckMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, check_type: impl Into<CheckType>, check: Box<dyn Check>) {
        self.0.entry(check_type.into()).or_default().push(check);
    }

    pub fn get(&self, check_type: &str) -> Option<&[Box<dyn Check>]> {
        self.0.get(check_type).map(Vec::as_slice)
    }

    pub fn find(&self, check_type: &str, name: &str) -> Option<&dyn Check> {
        self.get(check_type)?
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c)
    }

    pub fn contains_type(&self, check_type: &str) -> bool {
        self.0.contains_key(check_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &CheckType> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, CheckType, Bucket> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, CheckType, Bucket> {
        self.0.iter_mut()
    }

    pub fn checks(&self) -> impl Iterator<Item = &dyn Check> {
        self.0.values().flat_map(|b| b.iter().map(|c| &**c))
    }

    pub fn checks_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Check>> {
        self.0.values_mut().flat_map(|b| b.iter_mut())
    }

    /// Total number of checks across all types.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Initialises every check with the tag of the bucket it lives in.
    pub fn init_all(&mut self) {
        for (check_type, bucket) in self.0.iter_mut() {
            for check in bucket.iter_mut() {
                check.init(check_type);
            }
        }
    }

    /// Folds `incoming` into this map.
    ///
    /// An unnamed incoming check is applied to every existing check of its
    /// type and then dropped. A named one is merged into the existing check
    /// of the same type and name, or appended when there is none. An
    /// [`InvalidCheck`] replaces whatever it targets so its error is reported.
    pub fn merge(&mut self, incoming: CheckMap) -> Result<(), MergeError> {
        for (check_type, checks) in incoming.0 {
            let bucket = self.0.entry(check_type).or_default();
            for check in checks {
                let any: &dyn Any = check.as_ref();
                if let Some(invalid) = any.downcast_ref::<InvalidCheck>() {
                    replace_with_invalid(bucket, invalid, check.name().is_empty());
                    if !check.name().is_empty() && !bucket.iter().any(|c| c.name() == check.name()) {
                        bucket.push(check);
                    }
                    continue;
                }
                if check.name().is_empty() {
                    for existing in bucket.iter_mut() {
                        existing.merge(check.as_ref())?;
                    }
                    continue;
                }
                match bucket.iter_mut().find(|c| c.name() == check.name()) {
                    Some(existing) => existing.merge(check.as_ref())?,
                    None => bucket.push(check),
                }
            }
        }
        self.0.retain(|_, bucket| !bucket.is_empty());
        Ok(())
    }

    /// Keeps only checks of the listed types (all types when `types` is
    /// empty), dropping database-backed checks when `exclude_db` is set.
    /// Types left without checks are removed.
    pub fn filter(&mut self, types: &[String], exclude_db: bool) {
        let map = std::mem::take(&mut self.0);
        self.0 = map
            .into_iter()
            .filter(|(check_type, _)| types.is_empty() || types.iter().any(|t| check_type == t.as_str()))
            .filter_map(|(check_type, bucket)| {
                let kept: Bucket = bucket
                    .into_iter()
                    .filter(|c| !(exclude_db && c.requires_database()))
                    .collect();
                (!kept.is_empty()).then_some((check_type, kept))
            })
            .collect();
    }
}

fn replace_with_invalid(bucket: &mut Bucket, invalid: &InvalidCheck, wildcard: bool) {
    for existing in bucket.iter_mut() {
        if wildcard || existing.name() == invalid.name() {
            let name = existing.name().to_string();
            *existing = Box::new(invalid.renamed(&name));
        }
    }
}

impl FromIterator<(CheckType, Vec<Box<dyn Check>>)> for CheckMap {
    fn from_iter<I: IntoIterator<Item = (CheckType, Vec<Box<dyn Check>>)>>(iter: I) -> Self {
        let mut map = CheckMap::new();
        for (check_type, checks) in iter {
            map.0.entry(check_type).or_default().extend(checks);
        }
        map
    }
}

impl IntoIterator for CheckMap {
    type Item = (CheckType, Bucket);
    type IntoIter = btree_map::IntoIter<CheckType, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
