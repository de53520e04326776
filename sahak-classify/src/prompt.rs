use sahak_common::Grounding;

/// Instruction text for one page.
///
/// `grounded` is used when a snippet is available and may reference
/// `{name}` and `{snippet}`; `knowledge` is the fallback that only sees
/// `{name}`. The output-format block is appended to both and always asks
/// for `<label tag>: <category>` on the first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    grounded: String,
    knowledge: String,
    format: String,
    label_tag: String,
    snippet_limit: Option<usize>,
}

/// A filled-in prompt and the variant it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub text: String,
    pub grounding: Grounding,
}

impl PromptTemplate {
    pub fn new(
        grounded: impl Into<String>,
        knowledge: impl Into<String>,
        label_tag: impl Into<String>,
    ) -> Self {
        let label_tag = label_tag.into();
        Self {
            grounded: grounded.into(),
            knowledge: knowledge.into(),
            format: format!("[출력 형식]\n첫 번째 줄: {label_tag}: [분류명]\n두 번째 줄 이하: 핵심 근거와 상세 분석 (마크다운)"),
            label_tag,
            snippet_limit: None,
        }
    }

    /// Replace the output-format block appended to both variants.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Cut snippets to `limit` characters before they are embedded.
    pub fn with_snippet_limit(mut self, limit: usize) -> Self {
        self.snippet_limit = Some(limit);
        self
    }

    pub fn label_tag(&self) -> &str {
        &self.label_tag
    }

    pub fn snippet_limit(&self) -> Option<usize> {
        self.snippet_limit
    }

    pub fn render(&self, name: &str, snippet: Option<&str>) -> RenderedPrompt {
        let snippet = snippet.filter(|s| !s.trim().is_empty());
        let (body, grounding) = match snippet {
            Some(text) => {
                let text = match self.snippet_limit {
                    Some(limit) => sahak_web::extract::truncate_chars(text, limit),
                    None => text,
                };
                (
                    fill(&self.grounded, &[("name", name), ("snippet", text)]),
                    Grounding::Snippet,
                )
            }
            None => (fill(&self.knowledge, &[("name", name)]), Grounding::Knowledge),
        };

        RenderedPrompt {
            text: format!("{}\n\n{}", body.trim_end(), self.format),
            grounding,
        }
    }

    /// Reply substituted for a failed model call.
    pub fn error_reply(&self, error_label: &str, error: &str) -> String {
        format!("{}: {error_label}\n오류 내용: {error}", self.label_tag)
    }
}

/// Substitute `{key}` placeholders in a single left-to-right pass.
///
/// Inserted values are never scanned again, so user text that happens to
/// contain `{snippet}` stays literal. Unknown placeholders are kept.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
