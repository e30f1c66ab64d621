use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use shipshape_types::CheckType;

use crate::check::Check;

/// Builds a check instance from its policy-document entry.
pub type DecodeFn = fn(serde_yaml::Value) -> Result<Box<dyn Check>, serde_yaml::Error>;

/// Maps check-type tags to decoders.
///
/// Populated once at program start and read-only afterwards. Registering a tag
/// twice replaces the earlier decoder.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    decoders: BTreeMap<CheckType, Entry>,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    decode: DecodeFn,
    requires_database: bool,
}

fn decode<T>(value: serde_yaml::Value) -> Result<Box<dyn Check>, serde_yaml::Error>
where
    T: Check + DeserializeOwned,
{
    let check: T = serde_yaml::from_value(value)?;
    Ok(Box::new(check))
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, check_type: impl Into<CheckType>) -> &mut Self
    where
        T: Check + DeserializeOwned + Default,
    {
        let entry = Entry {
            decode: decode::<T>,
            requires_database: T::default().requires_database(),
        };
        self.decoders.insert(check_type.into(), entry);
        self
    }

    /// Whether checks of this type need a database. Unknown tags do not.
    pub fn requires_database(&self, check_type: &str) -> bool {
        self.decoders
            .get(check_type)
            .is_some_and(|entry| entry.requires_database)
    }

    pub fn contains(&self, check_type: &str) -> bool {
        self.decoders.contains_key(check_type)
    }

    /// Registered tags in sorted order.
    pub fn check_types(&self) -> impl Iterator<Item = &CheckType> {
        self.decoders.keys()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decodes one entry. `None` means the tag is not registered.
    pub fn decode(
        &self,
        check_type: &str,
        value: serde_yaml::Value,
    ) -> Option<Result<Box<dyn Check>, serde_yaml::Error>> {
        self.decoders.get(check_type).map(|entry| (entry.decode)(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestCheck;

    fn yaml(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).expect("valid yaml")
    }

    #[test]
    fn decodes_registered_types() {
        let mut registry = Registry::new();
        registry.register::<TestCheck>("test");

        let check = registry
            .decode("test", yaml("name: a\nseverity: high\n"))
            .expect("registered")
            .expect("decodes");
        assert_eq!(check.name(), "a");
        assert_eq!(check.base().severity, Some(shipshape_types::Severity::High));
    }

    #[test]
    fn unknown_tags_are_none() {
        let registry = Registry::new();
        assert!(registry.decode("nope", yaml("name: a")).is_none());
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn duplicate_registration_is_last_writer_wins() {
        let mut registry = Registry::new();
        registry.register::<TestCheck>("test");
        registry.register::<TestCheck>("test");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.check_types().map(|t| t.as_str()).collect::<Vec<_>>(),
            vec!["test"]
        );
    }

    #[test]
    fn database_requirement_comes_from_the_type() {
        #[derive(Debug, Default, serde::Deserialize)]
        struct DbCheck {
            #[serde(flatten)]
            base: crate::check::CheckBase,
        }
        impl Check for DbCheck {
            fn base(&self) -> &crate::check::CheckBase {
                &self.base
            }
            fn base_mut(&mut self) -> &mut crate::check::CheckBase {
                &mut self.base
            }
            fn merge(&mut self, other: &dyn Check) -> Result<(), crate::check::MergeError> {
                let other = crate::check::downcast_check::<Self>(other)?;
                self.base.merge(&other.base)
            }
            fn requires_database(&self) -> bool {
                true
            }
        }

        let mut registry = Registry::new();
        registry.register::<TestCheck>("test").register::<DbCheck>("db");
        assert!(registry.requires_database("db"));
        assert!(!registry.requires_database("test"));
        assert!(!registry.requires_database("nope"));
    }

    #[test]
    fn decode_errors_surface() {
        let mut registry = Registry::new();
        registry.register::<TestCheck>("test");
        let err = registry
            .decode("test", yaml("name: a\nseverity: urgent\n"))
            .expect("registered");
        assert!(err.is_err());
    }
}
