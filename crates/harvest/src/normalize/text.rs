// ABOUTME: Text cleanup for titles, descriptions, tags and model names.
// ABOUTME: Newline stripping, trimming, title-casing and literal boilerplate label removal.

/// Boilerplate labels removed from descriptions. Disjoint literals, so order is irrelevant.
pub const DESCRIPTION_LABELS: &[&str] = &[
    "Synopsis",
    "DESCRIPTION:",
    "Description:",
    "Episode Summary",
];

/// Prefix some sites put in front of the cast list.
pub const STARRING_PREFIX: &str = "Starring: ";

/// Removes newlines and surrounding whitespace.
pub fn strip_newlines(s: &str) -> String {
    s.replace(['\n', '\r'], "").trim().to_string()
}

/// Title-cases a string: the first letter of each word is upper-cased and
/// the rest lower-cased. Apostrophes do not start a new word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = !(c == '\'' || c == '\u{2019}' || c.is_numeric());
        }
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Normalizes a title: newline strip, trim, title-case.
pub fn clean_title(raw: &str) -> Option<String> {
    non_empty(title_case(&strip_newlines(raw)))
}

/// Normalizes a description: newline strip, trim, boilerplate label removal.
pub fn clean_description(raw: &str) -> Option<String> {
    let mut text = strip_newlines(raw);
    for label in DESCRIPTION_LABELS {
        text = text.replace(label, "");
    }
    non_empty(text.trim().to_string())
}

/// Normalizes one tag: title-case, commas and newlines removed, trimmed.
pub fn clean_tag(raw: &str) -> Option<String> {
    non_empty(strip_newlines(&title_case(raw).replace(',', "")))
}

/// Normalizes one model name: title-case, commas removed, trimmed, "Starring: " dropped.
pub fn clean_model(raw: &str) -> Option<String> {
    let name = strip_newlines(&title_case(raw).replace(',', ""));
    let name = name.strip_prefix(STARRING_PREFIX).unwrap_or(&name).trim();
    non_empty(name.to_string())
}

/// Joins list values for a record cell.
pub fn join_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("the NIGHT shift"), "The Night Shift");
        assert_eq!(title_case("don't stop"), "Don't Stop");
        assert_eq!(title_case("part-two: 2nd take"), "Part-Two: 2nd Take");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn clean_title_strips_newlines_and_cases() {
        assert_eq!(
            clean_title("\n   a summer\n story  "),
            Some("A Summer Story".to_string())
        );
        assert_eq!(clean_title(" \n "), None);
    }

    #[test]
    fn clean_description_removes_labels() {
        assert_eq!(
            clean_description("Synopsis\n  Two friends go hiking."),
            Some("Two friends go hiking.".to_string())
        );
        assert_eq!(
            clean_description("Description: A quiet evening. Episode Summary"),
            Some("A quiet evening.".to_string())
        );
        assert_eq!(clean_description("DESCRIPTION:"), None);
    }

    #[test]
    fn clean_model_drops_starring_prefix() {
        assert_eq!(
            clean_model("starring: jane doe,"),
            Some("Jane Doe".to_string())
        );
        assert_eq!(clean_model("  JOHN SMITH "), Some("John Smith".to_string()));
        assert_eq!(clean_model(","), None);
    }

    #[test]
    fn clean_tag_and_join() {
        let tags: Vec<String> = ["outdoor,", "\nbehind the scenes "]
            .iter()
            .filter_map(|t| clean_tag(t))
            .collect();
        assert_eq!(tags, vec!["Outdoor", "Behind The Scenes"]);
        assert_eq!(
            join_list(&tags),
            Some("Outdoor, Behind The Scenes".to_string())
        );
        assert_eq!(join_list(&[]), None);
    }
}
