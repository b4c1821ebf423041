// ABOUTME: Parsing of user-entered tag strings
// ABOUTME: Splits comma or space delimited input, honouring double-quoted names

use std::collections::BTreeSet;

/// Parse a raw tag string into a sorted, de-duplicated list of tag names.
///
/// Input without commas or double quotes is split on spaces. Otherwise
/// double-quoted sections become single names, and the unquoted remainder is
/// split on commas when an unquoted comma is present, on spaces when not.
/// An unterminated quote treats the rest of the input as unquoted.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }

    if !input.contains(',') && !input.contains('"') {
        return split_strip(input, ' ').collect::<BTreeSet<_>>().into_iter().collect();
    }

    let mut words: BTreeSet<String> = BTreeSet::new();
    let mut buffer = String::new();
    // Unquoted sections are split once we know which delimiter applies
    let mut to_be_split: Vec<String> = Vec::new();
    let mut saw_loose_comma = false;
    let mut open_quote = false;

    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            if !buffer.is_empty() {
                to_be_split.push(std::mem::take(&mut buffer));
            }
            open_quote = true;
            for quoted in chars.by_ref() {
                if quoted == '"' {
                    open_quote = false;
                    break;
                }
                buffer.push(quoted);
            }
            if open_quote {
                break;
            }
            let word = buffer.trim();
            if !word.is_empty() {
                words.insert(word.to_string());
            }
            buffer.clear();
        } else {
            if c == ',' {
                saw_loose_comma = true;
            }
            buffer.push(c);
        }
    }

    if !buffer.is_empty() {
        if open_quote && buffer.contains(',') {
            saw_loose_comma = true;
        }
        to_be_split.push(buffer);
    }

    let delimiter = if saw_loose_comma { ',' } else { ' ' };
    for chunk in &to_be_split {
        words.extend(split_strip(chunk, delimiter));
    }

    words.into_iter().collect()
}

/// Build a string that `parse_tag_input` turns back into `names`, for
/// pre-filling a tag field.
pub fn edit_string_for_tags<S: AsRef<str>>(names: &[S]) -> String {
    let mut use_commas = false;
    let mut parts = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        if name.contains(',') {
            parts.push(format!("\"{}\"", name));
            continue;
        }
        if name.contains(' ') {
            use_commas = true;
        }
        parts.push(name.to_string());
    }

    let glue = if use_commas { ", " } else { " " };
    parts.join(glue)
}

fn split_strip(input: &str, delimiter: char) -> impl Iterator<Item = String> + '_ {
    input
        .split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("   ", &[])]
    #[case("one", &["one"])]
    #[case("one two three", &["one", "three", "two"])]
    #[case("one  one two", &["one", "two"])]
    #[case("one, two", &["one", "two"])]
    #[case("one two, three", &["one two", "three"])]
    #[case(",one,,two,", &["one", "two"])]
    #[case("\"one two\" three", &["one two", "three"])]
    #[case("\"one, two\" three", &["one, two", "three"])]
    #[case("\"one two\", three four", &["one two", "three four"])]
    #[case("a-one \"a-two\" \"a three\"", &["a three", "a-one", "a-two"])]
    #[case("\"\"", &[])]
    #[case("\"  \" solo", &["solo"])]
    fn test_parse_tag_input(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_tag_input(input), expected);
    }

    #[test]
    fn test_unterminated_quote_is_unquoted() {
        assert_eq!(parse_tag_input("one \"two three"), vec!["one", "three", "two"]);
    }

    #[test]
    fn test_unterminated_quote_with_comma_splits_on_commas() {
        assert_eq!(parse_tag_input("one \"two, three"), vec!["one", "three", "two"]);
        assert_eq!(parse_tag_input("one two \"three, four"), vec!["four", "one two", "three"]);
    }

    #[test]
    fn test_quoted_duplicates_collapse() {
        assert_eq!(parse_tag_input("\"dog\" dog, dog"), vec!["dog"]);
    }

    #[test]
    fn test_edit_string_uses_spaces_for_simple_names() {
        assert_eq!(edit_string_for_tags(&["cat", "dog"]), "cat dog");
    }

    #[test]
    fn test_edit_string_uses_commas_when_names_have_spaces() {
        assert_eq!(edit_string_for_tags(&["cat", "big dog"]), "cat, big dog");
    }

    #[test]
    fn test_edit_string_quotes_names_with_commas() {
        assert_eq!(edit_string_for_tags(&["cat", "dog, big"]), "cat \"dog, big\"");
    }

    #[test]
    fn test_edit_string_parses_back() {
        let names = vec!["big dog".to_string(), "cat".to_string(), "red, blue".to_string()];
        assert_eq!(parse_tag_input(&edit_string_for_tags(&names)), names);
    }
}
