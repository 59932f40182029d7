use on_change_value::Value;

use crate::cache::IdentityCache;
use crate::options::Options;

/// Whether changes to `key` are never observed.
pub(crate) fn is_ignored(cache: &IdentityCache, options: &Options, key: &Value) -> bool {
    if cache.is_unsubscribed() {
        return true;
    }
    match key {
        Value::Symbol(_) => options.ignore_symbols,
        Value::String(name) => {
            (options.ignore_underscores && name.starts_with('_'))
                || options.ignore_keys.iter().any(|k| **k == **name)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use on_change_value::Symbol;

    use super::*;

    #[test]
    fn test_defaults_ignore_nothing() {
        let cache = IdentityCache::new();
        let options = Options::default();
        assert!(!is_ignored(&cache, &options, &Value::from("_private")));
        assert!(!is_ignored(&cache, &options, &Value::from(Symbol::new("s"))));
    }

    #[test]
    fn test_ignore_options() {
        let cache = IdentityCache::new();
        let options = Options::new()
            .ignore_symbols(true)
            .ignore_underscores(true)
            .ignore_keys(["secret"]);
        assert!(is_ignored(&cache, &options, &Value::from(Symbol::new("s"))));
        assert!(is_ignored(&cache, &options, &Value::from("_private")));
        assert!(is_ignored(&cache, &options, &Value::from("secret")));
        assert!(!is_ignored(&cache, &options, &Value::from("public")));
        assert!(!is_ignored(&cache, &options, &Value::from(0)));
    }

    #[test]
    fn test_everything_ignored_after_unsubscribe() {
        let mut cache = IdentityCache::new();
        cache.unsubscribe();
        assert!(is_ignored(&cache, &Options::default(), &Value::from("a")));
    }
}
