//! Recognizes "table does not exist" failures from backend messages.

/// Fully-qualified name of the pets table.
#[cfg(test)]
pub const PETS_TABLE: &str = "public.pets";

/// Fully-qualified name of the adoption requests table.
#[cfg(test)]
pub const REQUESTS_TABLE: &str = "public.adoption_requests";

/// Returns true when `message` names `table_name` as a quoted token.
///
/// The backend reports a missing relation as e.g.
/// `Could not find the table 'public.pets' in the schema cache`. Only the
/// exact quoted name counts, so `'public.pets_archive'` does not match
/// `public.pets`.
pub fn is_table_missing(message: Option<&str>, table_name: &str) -> bool {
  let Some(message) = message.filter(|m| !m.is_empty()) else {
    return false;
  };
  if table_name.is_empty() {
    return false;
  }

  message.contains(&format!("'{}'", table_name)) || message.contains(&format!("\"{}\"", table_name))
}

/// Classifier bound to the default-schema pets table. The REST adapter
/// classifies against the configured schema instead.
#[cfg(test)]
pub fn is_pets_table_missing(message: Option<&str>) -> bool {
  is_table_missing(message, PETS_TABLE)
}

#[cfg(test)]
pub fn is_requests_table_missing(message: Option<&str>) -> bool {
  is_table_missing(message, REQUESTS_TABLE)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_single_quoted_table_matches() {
    let msg = "Could not find the table 'public.pets' in the schema cache";
    assert!(is_pets_table_missing(Some(msg)));
    assert!(!is_requests_table_missing(Some(msg)));
  }

  #[test]
  fn test_double_quoted_table_matches() {
    let msg = r#"relation "public.adoption_requests" does not exist"#;
    assert!(is_requests_table_missing(Some(msg)));
  }

  #[test]
  fn test_empty_and_missing_messages() {
    assert!(!is_pets_table_missing(None));
    assert!(!is_pets_table_missing(Some("")));
    assert!(!is_table_missing(Some("'public.pets'"), ""));
  }

  #[test]
  fn test_unquoted_name_does_not_match() {
    assert!(!is_pets_table_missing(Some(
      "permission denied for table public.pets"
    )));
  }

  #[test]
  fn test_similar_table_name_does_not_match() {
    assert!(!is_pets_table_missing(Some(
      "Could not find the table 'public.pets_archive' in the schema cache"
    )));
    assert!(!is_pets_table_missing(Some(
      "Could not find the table 'private.public.pets' in the schema cache"
    )));
  }
}
