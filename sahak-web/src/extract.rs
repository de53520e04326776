//! Selector-based text extraction shared by the source adapters.

use crate::SourceError;
use scraper::{ElementRef, Html, Node, Selector};

/// Subtrees whose text never belongs in a snippet.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Parse a CSS selector, reporting bad input as a [`SourceError`].
pub fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|_| SourceError::Selector(css.to_string()))
}

/// Every text node under `el`, each trimmed, concatenated without separators.
/// Empty nodes and script/style subtrees are dropped.
pub fn stripped_text(el: &ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_stripped(el, &mut out);
    out
}

fn collect_stripped(el: &ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text.trim()),
            Node::Element(element) => {
                if SKIP_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_stripped(&child_ref, out);
                }
            }
            _ => {}
        }
    }
}

/// Raw text of `el`, whitespace preserved.
pub fn raw_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// Stripped text of the elements matched by the first selector in `chain`
/// that matches anything. At most `take` elements are considered and only
/// texts longer than `min_chars` survive.
pub fn fragments(
    doc: &Html,
    chain: &[&str],
    take: usize,
    min_chars: usize,
) -> Result<Vec<String>, SourceError> {
    for css in chain {
        let sel = selector(css)?;
        let matched: Vec<ElementRef<'_>> = doc.select(&sel).take(take).collect();
        if matched.is_empty() {
            continue;
        }
        return Ok(matched
            .iter()
            .map(stripped_text)
            .filter(|text| !text.is_empty() && text.chars().count() > min_chars)
            .collect());
    }
    Ok(Vec::new())
}

/// Value of `attr` on the first element matched by any selector in `chain`.
pub fn first_attr(doc: &Html, chain: &[&str], attr: &str) -> Result<Option<String>, SourceError> {
    for css in chain {
        let sel = selector(css)?;
        if let Some(el) = doc.select(&sel).next() {
            return Ok(el.value().attr(attr).map(str::to_string));
        }
    }
    Ok(None)
}

/// Cut `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <ul class="search_list">
            <li><p class="cont">  김옥균은 갑신정변을 주도한   <b>급진 개화파</b> 인물이다. 일본의 메이지 유신을 모델로 삼았다. </p></li>
            <li><p class="cont">짧은 글</p></li>
            <li><p class="cont">박영효와 함께 개화당을 이끌며 청으로부터의 자주 독립과 근대 개혁을 추진하였다.</p></li>
            <li><p class="cont">네 번째 항목은 잘려야 하며 결과에 포함되지 않아야 하는 긴 문장입니다.</p></li>
          </ul>
          <script>var tracking = "ignored";</script>
        </body></html>
    "#;

    #[test]
    fn stripped_text_trims_each_node_and_skips_scripts() {
        let doc = Html::parse_document(
            "<div id=\"x\"> 가 <span> 나 </span><script>skip()</script> 다 </div>",
        );
        let sel = selector("#x").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(stripped_text(&el), "가나다");
    }

    #[test]
    fn fragments_take_then_filter_short_texts() {
        let doc = Html::parse_document(SEARCH_PAGE);
        let out = fragments(&doc, &[".search_list li .cont", ".result_list li"], 3, 30).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("김옥균은 갑신정변을 주도한급진 개화파"));
        assert!(out[1].starts_with("박영효와"));
    }

    #[test]
    fn fragments_fall_back_to_next_selector() {
        let doc = Html::parse_document(
            "<ul class=\"result_list\"><li>최익현은 위정척사 운동을 이끈 대표적인 유학자로 개항에 반대하였다.</li></ul>",
        );
        let out = fragments(&doc, &[".search_list li .cont", ".result_list li"], 3, 30).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("위정척사"));
    }

    #[test]
    fn fragments_empty_when_nothing_matches() {
        let doc = Html::parse_document("<p>검색 결과가 없습니다.</p>");
        let out = fragments(&doc, &[".search_list li .cont"], 3, 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn bad_selector_is_reported() {
        let err = selector("li[").unwrap_err();
        assert!(matches!(err, SourceError::Selector(_)));
    }

    #[test]
    fn first_attr_walks_the_chain() {
        let doc = Html::parse_document(
            r#"<div class="mw-parser-output"><div class="thumb"><img src="//upload.example/a.jpg"></div></div>"#,
        );
        let src = first_attr(&doc, &[".infobox img", ".mw-parser-output .thumb img"], "src").unwrap();
        assert_eq!(src.as_deref(), Some("//upload.example/a.jpg"));
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("가나다라", 2), "가나");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
