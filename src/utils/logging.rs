use serde::Serialize;

/// Hands a pretty-printed JSON rendering of `value` to `log_action`, but only
/// when DEBUG is enabled for the caller. Serialization failures are logged
/// in place of the body rather than propagated.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let rendered = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(error) => format!("<unserializable body: {error}>"),
    };
    log_action(&rendered);
}
