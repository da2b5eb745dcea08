/// The service reports unset text properties as empty strings
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    Some(value)
}
