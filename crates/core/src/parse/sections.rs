use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub body: String,
}

fn section_marker_regex() -> &'static Regex {
    static SECTION_MARKER_RE: OnceLock<Regex> = OnceLock::new();
    SECTION_MARKER_RE.get_or_init(|| {
        Regex::new(r"SECTION: (?P<name>\w+)").expect("section marker regex must compile")
    })
}

/// Splits `text` on `SECTION: <Name>` markers.
///
/// Text before the first marker is dropped and every body is trimmed.
/// Duplicate names are kept in order; text without markers yields no
/// sections.
pub fn split_sections(text: &str) -> Vec<Section> {
    let markers: Vec<_> = section_marker_regex().captures_iter(text).collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let name = caps.name("name")?.as_str();
            let end = markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            Some(Section {
                name: name.to_string(),
                body: text[whole.end()..end].trim().to_string(),
            })
        })
        .collect()
}

/// Bodies of all sections called `name`, in order of appearance.
pub fn bodies_named<'a>(sections: &'a [Section], name: &'a str) -> impl Iterator<Item = &'a str> {
    sections
        .iter()
        .filter(move |s| s.name == name)
        .map(|s| s.body.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sections_and_drops_preamble() {
        let text = "Here you go!\nSECTION: PortfolioSummary\n  Stay diversified.  \n\nSECTION: KeyInsights\n- Insight: Rates are flat.\n";
        let sections = split_sections(text);
        assert_eq!(
            sections,
            vec![
                Section {
                    name: "PortfolioSummary".to_string(),
                    body: "Stay diversified.".to_string(),
                },
                Section {
                    name: "KeyInsights".to_string(),
                    body: "- Insight: Rates are flat.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn returns_one_section_per_marker() {
        let text = (0..7)
            .map(|i| format!("SECTION: Part{i}\nbody {i}\n"))
            .collect::<String>();
        let sections = split_sections(&text);
        assert_eq!(sections.len(), 7);
        assert!(sections
            .iter()
            .enumerate()
            .all(|(i, s)| s.name == format!("Part{i}") && s.body == format!("body {i}")));
    }

    #[test]
    fn text_without_markers_yields_nothing() {
        assert!(split_sections("just prose, no structure").is_empty());
        assert!(split_sections("").is_empty());
    }

    #[test]
    fn keeps_duplicates_and_empty_bodies() {
        let text = "SECTION: A\none\nSECTION: B\nSECTION: A\ntwo";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].body, "");
        assert_eq!(bodies_named(&sections, "A").collect::<Vec<_>>(), vec!["one", "two"]);
    }
}
