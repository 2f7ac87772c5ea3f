use glight_log::{ReaderOptions, TailPolicy, DEFAULT_MAX_RECORD_SIZE};
use serde::{Deserialize, Serialize};

/// What replay does with a type tag nobody registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Fail with [`PersistError::UnknownType`](crate::PersistError::UnknownType).
    #[default]
    Reject,
    /// Materialize an [`Entity`](crate::Entity) carrying the unknown tag.
    Dynamic,
}

/// Configuration for a persistence [`Context`](crate::Context).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Handling of a frame cut short at the end of the log.
    pub tail_policy: TailPolicy,
    /// Largest encoded record accepted while reading.
    pub max_record_size: u32,
    pub unknown_types: UnknownTypePolicy,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            tail_policy: TailPolicy::Reject,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            unknown_types: UnknownTypePolicy::Reject,
        }
    }
}

impl ContextConfig {
    /// Lenient settings for tools that replay logs of any application.
    pub fn permissive() -> Self {
        Self {
            tail_policy: TailPolicy::Ignore,
            unknown_types: UnknownTypePolicy::Dynamic,
            ..Default::default()
        }
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            max_record_size: self.max_record_size,
            tail_policy: self.tail_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let config = ContextConfig::default();
        assert_eq!(config.tail_policy, TailPolicy::Reject);
        assert_eq!(config.unknown_types, UnknownTypePolicy::Reject);
        assert_eq!(config.reader_options(), ReaderOptions::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ContextConfig =
            serde_json::from_str(r#"{"unknown_types":"dynamic"}"#).unwrap();
        assert_eq!(config.unknown_types, UnknownTypePolicy::Dynamic);
        assert_eq!(config.max_record_size, DEFAULT_MAX_RECORD_SIZE);
    }

    #[test]
    fn permissive_relaxes_tail_and_types() {
        let config = ContextConfig::permissive();
        assert_eq!(config.reader_options().tail_policy, TailPolicy::Ignore);
        assert_eq!(config.unknown_types, UnknownTypePolicy::Dynamic);
    }
}
