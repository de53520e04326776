//! Plain-text presentation of results for the terminal.

use sahak_classify::{Assessment, Label, PageId, PagePreset, Profile, Verdict};
use std::fmt::Write;

pub fn pages() -> String {
    let mut out = String::new();
    for id in PageId::ALL {
        let _ = writeln!(out, "{:<14} {}", id.as_str(), id.title());
        let Ok(preset) = PagePreset::for_page(id) else {
            continue;
        };
        for (category, about) in preset.guide {
            let _ = writeln!(out, "  - {category}: {about}");
        }
        if let Some(model) = preset.model {
            let _ = writeln!(out, "  (모델: {model})");
        }
    }
    out
}

pub fn verdict_line(assessment: &Assessment) -> Option<String> {
    let label = &assessment.label;
    assessment.verdict.map(|verdict| match verdict {
        Verdict::Match => format!("🎯 정답입니다! ({label})"),
        Verdict::Mismatch => format!("🧐 틀렸습니다. 분석 결과는 {label}입니다."),
    })
}

pub fn assessment(assessment: &Assessment, show_snippet: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}", assessment.name);
    match &assessment.label {
        Label::Error(_) => {
            let _ = writeln!(out, "⚠️ 분석에 실패했습니다.");
        }
        label => {
            let _ = writeln!(out, "분류: {label}");
        }
    }
    if let Some(line) = verdict_line(assessment) {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out, "{}", assessment.grounding.describe());

    let explanation = assessment.explanation.trim();
    if !explanation.is_empty() {
        let _ = writeln!(out, "\n{explanation}");
    }

    if show_snippet {
        match &assessment.snippet {
            Some(snippet) => {
                let _ = writeln!(out, "\n[참고 사료: {}]\n{}", snippet.source.label(), snippet.text);
            }
            None => {
                let _ = writeln!(out, "\n[참고 사료 없음]");
            }
        }
    }
    out
}

pub fn profile(profile: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", profile.name);
    if let Some(url) = &profile.image_url {
        let _ = writeln!(out, "이미지: {url}");
    }
    let _ = writeln!(out, "\n{}", profile.summary.trim());
    let _ = writeln!(out, "\n[위키백과 원문 일부]\n{}", profile.excerpt());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sahak_common::Grounding;
    use sahak_web::{Snippet, SourceId};

    fn sample(label: Label, verdict: Option<Verdict>) -> Assessment {
        Assessment {
            name: "안중근".into(),
            label,
            explanation: "하얼빈 의거를 일으켰다.".into(),
            verdict,
            guess: verdict.map(|_| "의열투쟁".into()),
            snippet: Some(Snippet::new(SourceId::EncyKorea, "대한의군 참모중장")),
            grounding: Grounding::Snippet,
            reply: String::new(),
            model_failed: false,
        }
    }

    #[test]
    fn match_and_mismatch_lines() {
        let hit = sample(Label::Category("의열투쟁".into()), Some(Verdict::Match));
        assert_eq!(verdict_line(&hit).unwrap(), "🎯 정답입니다! (의열투쟁)");

        let miss = sample(Label::Category("무장투쟁론".into()), Some(Verdict::Mismatch));
        assert_eq!(
            verdict_line(&miss).unwrap(),
            "🧐 틀렸습니다. 분석 결과는 무장투쟁론입니다."
        );
    }

    #[test]
    fn no_guess_no_verdict_line() {
        let a = sample(Label::Category("의열투쟁".into()), None);
        assert!(verdict_line(&a).is_none());
        let text = assessment(&a, false);
        assert!(text.contains("분류: 의열투쟁"));
        assert!(!text.contains("참고 사료"));
    }

    #[test]
    fn snippet_is_shown_with_its_source() {
        let a = sample(Label::Fallback("기타".into()), None);
        let text = assessment(&a, true);
        assert!(text.contains("[참고 사료: 한국민족문화대백과사전]"));
        assert!(text.contains("대한의군 참모중장"));
        assert!(text.contains("📚"));
    }

    #[test]
    fn error_label_is_flagged() {
        let a = sample(Label::Error("오류".into()), None);
        assert!(assessment(&a, false).contains("분석에 실패했습니다"));
    }

    #[test]
    fn pages_lists_every_preset() {
        let listing = pages();
        for id in PageId::ALL {
            assert!(listing.contains(id.as_str()));
        }
        assert!(listing.contains("  - 주화론: "));
        assert!(listing.contains("  - 신흥무인세력: 홍건적과 왜구를 격퇴하며"));
        assert!(listing.contains("(모델: gemini-2.5-flash)"));
    }

    #[test]
    fn profile_shows_image_and_excerpt() {
        let p = Profile {
            name: "나폴레옹".into(),
            summary: "프랑스의 황제".into(),
            image_url: Some("https://upload.example/n.jpg".into()),
            source_text: "나폴레옹 보나파르트는".into(),
            model_failed: false,
        };
        let text = profile(&p);
        assert!(text.contains("이미지: https://upload.example/n.jpg"));
        assert!(text.contains("나폴레옹 보나파르트는..."));
    }
}
