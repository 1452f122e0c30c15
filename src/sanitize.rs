use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// Strips everything from a generated message that is not a letter, digit,
/// whitespace, underscore, hyphen or punctuation mark.
///
/// Punctuation is any character in Unicode category P, in every script.
/// ASCII symbols such as `$`, `+`, `<`, `=`, `>`, `^`, `` ` ``, `|` and `~`
/// are category S and are removed, as are emoji and control characters.
pub fn sanitize(input: &str) -> String {
  input.chars().filter(|c| is_allowed(*c)).collect()
}

fn is_allowed(c: char) -> bool {
  c.is_alphanumeric() || c.is_whitespace() || c == '_' || c == '-' || is_punctuation(c)
}

fn is_punctuation(c: char) -> bool {
  c.general_category_group() == GeneralCategoryGroup::Punctuation
}
