use crate::domain::ResourceType;
use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Inspects `keys` in one batch call, retrying them one by one when the batch fails.
///
/// Keys that still cannot be inspected are left out; callers fall back to
/// listing data for them.
pub(crate) fn inspect_each<T, F>(
    kind: ResourceType,
    keys: &[String],
    inspect: F,
) -> HashMap<String, T>
where
    F: Fn(&[String]) -> Result<HashMap<String, T>>,
{
    if keys.is_empty() {
        return HashMap::new();
    }

    match inspect(keys) {
        Ok(details) => details,
        Err(e) => {
            warn!("Batch {kind} inspect failed, retrying one by one: {e:#}");
            let mut details = HashMap::new();
            for key in keys {
                match inspect(std::slice::from_ref(key)) {
                    Ok(found) => details.extend(found),
                    Err(e) => debug!(%key, "{kind} inspect failed, using listing data: {e:#}"),
                }
            }
            details
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::cell::RefCell;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn batch_success_is_used_as_is() {
        let calls = RefCell::new(0);
        let details = inspect_each(ResourceType::Image, &keys(&["a", "b"]), |ids| {
            *calls.borrow_mut() += 1;
            Ok(ids.iter().map(|id| (id.clone(), id.len())).collect())
        });

        assert_eq!(details.len(), 2);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn failed_batch_is_retried_per_key() {
        let details = inspect_each(ResourceType::Container, &keys(&["a", "gone", "c"]), |ids| {
            if ids.len() > 1 {
                bail!("batch failed");
            }
            if ids[0] == "gone" {
                bail!("no such container");
            }
            Ok(HashMap::from([(ids[0].clone(), 1)]))
        });

        let mut found: Vec<_> = details.keys().cloned().collect();
        found.sort();
        assert_eq!(found, vec!["a", "c"]);
    }

    #[test]
    fn no_keys_means_no_call() {
        let details: HashMap<String, u8> =
            inspect_each(ResourceType::Volume, &[], |_| panic!("inspect called"));
        assert!(details.is_empty());
    }
}
