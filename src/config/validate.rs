use super::ConfigError;

/// Checks that every field resolved to a value.
///
/// All missing fields are reported together, upper-cased and in declaration
/// order. With `ignore_errors` set the check is skipped entirely.
pub(crate) fn check_presence<'a, I>(fields: I, ignore_errors: bool) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    if ignore_errors {
        tracing::debug!("presence validation suppressed");
        return Ok(());
    }

    let missing: Vec<String> = fields
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name.to_uppercase())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::UndefinedFields(missing))
    }
}
