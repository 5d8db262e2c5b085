use crate::{DocumentModel, Edit, EditorError};
use sprout_common::{ensure_object_property, find_property, with_config_object};
use sprout_parser::{build, parse_expression};
use tracing::{debug, warn};

/// Add entries to `resolve.alias` of a build config
pub trait AliasInjection: DocumentModel {
    /// Add each `(key, value)` of `aliases` to the alias map
    ///
    /// Values are expression source and are spliced in as code. Keys that
    /// are already bound keep their existing value: the first binding wins,
    /// including between duplicate keys within `aliases`. When the factory
    /// call is not in the slot, or `resolve` or `alias` is bound to something
    /// other than an object literal, a diagnostic is recorded and the text is
    /// left as is.
    fn add_alias<I, K, V>(&mut self, slot: &str, aliases: I) -> Result<&mut Self, EditorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.document().slot(slot)?;
        let entries = aliases
            .into_iter()
            .map(|(key, value)| {
                let value = value.as_ref();
                let expression = parse_expression(value)?;
                Ok((
                    key.as_ref().to_string(),
                    build::graft_expression(value, expression),
                ))
            })
            .collect::<Result<Vec<_>, EditorError>>()?;

        let mut skipped = None;
        let document = self.document_mut();
        document.edit(slot, |program, options| {
            let found = with_config_object(program, &options.config_factory, |config| {
                let resolve = ensure_object_property(config, &options.resolve_key)?;
                let alias = ensure_object_property(resolve, &options.alias_key)?;

                let mut added = 0;
                for (key, value) in entries {
                    if find_property(alias, &key).is_some() {
                        debug!(slot, key = %key, "Alias already bound");
                        continue;
                    }
                    alias.properties.push(build::property(&key, value));
                    added += 1;
                }
                Ok(added)
            });

            match found {
                Ok(Some(added)) => {
                    debug!(slot, added, "Added aliases");
                    Ok(Edit::Applied)
                }
                Ok(None) => {
                    skipped = Some(format!(
                        "could not find a {}() call with an object argument",
                        options.config_factory
                    ));
                    Ok(Edit::Unchanged)
                }
                Err(err) => {
                    skipped = Some(format!(
                        "'{}.{}': {}",
                        options.resolve_key, options.alias_key, err
                    ));
                    Ok(Edit::Unchanged)
                }
            }
        })?;

        if let Some(reason) = skipped {
            warn!(slot, reason = %reason, "Aliases not added");
            document.push_diagnostic(slot, format!("{}; aliases not added", reason));
        }
        Ok(self)
    }
}
