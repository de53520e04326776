//! Built-in classification pages.

use crate::prompt::PromptTemplate;
use crate::vocabulary::Vocabulary;
use crate::ClassifyError;
use sahak_web::history_db::HistoryDbQuery;
use sahak_web::{DocumentSource, EncyKorea, HistoryDb, SourceError, SourceOptions};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    /// Enlightenment faction vs. defenders of orthodoxy (late Joseon).
    Gaehwa,
    /// Late-Goryeo power groups.
    GoryeoElite,
    /// Moderate vs. radical reformist scholar-officials.
    Sadaebu,
    /// War vs. peace factions during the 1636 Qing invasion.
    Byeongja,
    /// Independence-movement lines under Japanese rule.
    Independence,
}

impl PageId {
    pub const ALL: [PageId; 5] = [
        PageId::Gaehwa,
        PageId::GoryeoElite,
        PageId::Sadaebu,
        PageId::Byeongja,
        PageId::Independence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PageId::Gaehwa => "gaehwa",
            PageId::GoryeoElite => "goryeo-elite",
            PageId::Sadaebu => "sadaebu",
            PageId::Byeongja => "byeongja",
            PageId::Independence => "independence",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PageId::Gaehwa => "개화파 vs 위정척사파 분류기",
            PageId::GoryeoElite => "고려 말 권문세족과 신진사대부 분류",
            PageId::Sadaebu => "고려 말 온건파 사대부와 급진파 사대부 분류",
            PageId::Byeongja => "병자호란 당시 주전론자와 주화론자 분류",
            PageId::Independence => "일제강점기 인물 성향 분류기",
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageId {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PageId::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ClassifyError::UnknownPage(s.to_string()))
    }
}

/// Which document source a page looks names up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    HistoryDb(HistoryDbQuery),
    EncyKorea,
}

/// Everything that distinguishes one page from another.
#[derive(Debug, Clone)]
pub struct PagePreset {
    pub id: PageId,
    pub vocabulary: Vocabulary,
    pub template: PromptTemplate,
    pub source: SourceKind,
    /// Whether model replies are memoized on `(name, snippet)`.
    pub memoize_classification: bool,
    /// Model pinned by the page; `None` uses the configured model.
    pub model: Option<&'static str>,
    /// One line of background per category, shown in page listings.
    pub guide: &'static [(&'static str, &'static str)],
}

const HISTORY_SNIPPET_LIMIT: usize = 2500;

impl PagePreset {
    pub fn for_page(id: PageId) -> Result<Self, ClassifyError> {
        let preset = match id {
            PageId::Gaehwa => {
                let vocabulary = Vocabulary::new(["개화파", "위정척사파"], "기타")?;
                let template = PromptTemplate::new(
                    "당신은 한국 근대사 역사학자입니다.\n\
                     아래 [사료]를 바탕으로 인물 '{name}'의 성향을 분석하세요.\n\n\
                     [사료]: {snippet}\n\n\
                     [지시사항]\n\
                     1. 이 인물이 '개화파(급진/온건)'인지 '위정척사파'인지 명확히 분류하세요.\n\
                     2. 판단 근거를 사료 내용을 인용하여 설명하세요.",
                    "당신은 한국사 전문가입니다. 인물 '{name}'에 대해 알고 있는 지식을 바탕으로 분석하세요.\n\n\
                     [지시사항]\n\
                     1. 이 인물이 '개화파'인지 '위정척사파'인지 분류하세요.\n\
                     2. 해당 파벌로 분류되는 결정적인 역사적 사건이나 주장을 설명하세요.",
                    "결론",
                )
                .with_snippet_limit(HISTORY_SNIPPET_LIMIT);
                Self {
                    id,
                    template: with_category_format(template, &vocabulary),
                    vocabulary,
                    source: SourceKind::HistoryDb(HistoryDbQuery::default()),
                    memoize_classification: false,
                    model: None,
                    guide: GAEHWA_CATEGORIES,
                }
            }
            PageId::GoryeoElite => {
                let vocabulary =
                    Vocabulary::new(["권문세족", "신진사대부", "신흥무인세력"], "기타/미분류")?;
                let template = PromptTemplate::new(
                    "인물 '{name}'을 분석하여 '권문세족', '신진사대부', '신흥무인세력' 중 하나로 분류하세요.\n\
                     [사료]: {snippet}",
                    "인물 '{name}'을 분석하여 '권문세족', '신진사대부', '신흥무인세력' 중 하나로 분류하세요.\n\
                     [사료]: 지식 기반 분석",
                    "최종 분류",
                );
                Self {
                    id,
                    template: with_category_format(template, &vocabulary),
                    vocabulary,
                    source: SourceKind::HistoryDb(HistoryDbQuery {
                        limit: 15,
                        take: 3,
                        min_chars: 0,
                    }),
                    memoize_classification: true,
                    model: Some("gemini-2.5-flash"),
                    guide: GORYEO_CATEGORIES,
                }
            }
            PageId::Sadaebu => {
                let vocabulary = Vocabulary::new(["온건파 사대부", "급진파 사대부"], "기타")?;
                let template = PromptTemplate::new(
                    [GROUNDED_HISTORY_HEAD, SADAEBU_GUIDE].concat(),
                    [
                        "역사적 지식을 바탕으로 고려 말 인물 '{name}'을 분석하세요.\n\n",
                        SADAEBU_GUIDE,
                    ]
                    .concat(),
                    "최종 분류",
                )
                .with_snippet_limit(HISTORY_SNIPPET_LIMIT);
                Self {
                    id,
                    template: with_category_format(template, &vocabulary),
                    vocabulary,
                    source: SourceKind::HistoryDb(HistoryDbQuery {
                        take: 4,
                        ..HistoryDbQuery::default()
                    }),
                    memoize_classification: false,
                    model: Some("gemini-2.5-flash"),
                    guide: SADAEBU_CATEGORIES,
                }
            }
            PageId::Byeongja => {
                let vocabulary = Vocabulary::new(["주전론", "주화론"], "기타")?;
                let template = PromptTemplate::new(
                    [GROUNDED_HISTORY_HEAD, BYEONGJA_GUIDE].concat(),
                    [
                        "역사적 지식을 바탕으로 병자호란 시기 인물 '{name}'을 분석하세요.\n\n",
                        BYEONGJA_GUIDE,
                    ]
                    .concat(),
                    "최종 분류",
                )
                .with_snippet_limit(HISTORY_SNIPPET_LIMIT);
                Self {
                    id,
                    template: with_category_format(template, &vocabulary),
                    vocabulary,
                    source: SourceKind::HistoryDb(HistoryDbQuery {
                        take: 4,
                        ..HistoryDbQuery::default()
                    }),
                    memoize_classification: false,
                    model: None,
                    guide: BYEONGJA_CATEGORIES,
                }
            }
            PageId::Independence => {
                let vocabulary = Vocabulary::new(
                    ["무장투쟁론", "외교독립론", "실력양성론", "의열투쟁", "친일파"],
                    "기타",
                )?;
                let template = PromptTemplate::new(
                    "다음 [자료]를 바탕으로 인물 '{name}'을 분석하세요.\n[자료]: {snippet}",
                    "당신의 역사적 지식을 바탕으로 일제강점기 인물 '{name}'을 분석하세요.",
                    "최종 분류",
                );
                Self {
                    id,
                    template: with_category_format(template, &vocabulary),
                    vocabulary,
                    source: SourceKind::EncyKorea,
                    memoize_classification: true,
                    model: None,
                    guide: INDEPENDENCE_CATEGORIES,
                }
            }
        };
        Ok(preset)
    }

    /// Instantiate the page's document source.
    pub fn build_source(
        &self,
        opts: &SourceOptions,
    ) -> Result<Arc<dyn DocumentSource>, SourceError> {
        let source: Arc<dyn DocumentSource> = match self.source {
            SourceKind::HistoryDb(query) => Arc::new(HistoryDb::with_options(query, opts)?),
            SourceKind::EncyKorea => Arc::new(EncyKorea::with_options(opts)?),
        };
        Ok(source)
    }
}

fn with_category_format(template: PromptTemplate, vocabulary: &Vocabulary) -> PromptTemplate {
    let format = format!(
        "[분류 기준]: {}, {}\n\
         [출력 형식]\n\
         첫 번째 줄: {}: [분류명]\n\
         두 번째 줄 이하: 핵심 근거와 상세 분석 (마크다운)",
        vocabulary.categories().join(", "),
        vocabulary.fallback(),
        template.label_tag(),
    );
    template.with_format(format)
}

const GROUNDED_HISTORY_HEAD: &str =
    "다음 [사료]를 바탕으로 인물 '{name}'을 분석하세요.\n[사료]: {snippet}\n\n";

const SADAEBU_GUIDE: &str = "[역사적 배경]\n\
         고려 말 신진사대부는 개혁의 방향에 따라 두 파벌로 나뉘었습니다.\n\
         1. 온건파 사대부: 고려 왕조의 틀 안에서 점진적 개혁 추구 (예: 정몽주, 이색, 길재)\n\
         2. 급진파 사대부: 역성혁명 주장, 새 왕조(조선) 개창 주도 (예: 정도전, 조준, 권근)\n\n\
         [지시사항]\n\
         1. 이 인물이 '온건파 사대부'인지 '급진파 사대부'인지 명확히 분류하세요.\n\
         2. 왕조에 대한 태도, 토지 제도 개혁에 대한 입장, 최후 및 행적을 기준으로 설명하세요.";

const BYEONGJA_GUIDE: &str = "[역사적 배경: 병자호란(1636)]\n\
         당시 조선 조정은 청나라의 요구에 대한 대응을 두고 두 파로 갈라졌습니다.\n\
         1. 주전론 (척화파): 대의명분과 절의 중시, 결사항전 주장. (예: 김상헌, 삼학사)\n\
         2. 주화론 (주화파): 실리와 생존 중시, 화친 주장. (예: 최명길)\n\n\
         [지시사항]\n\
         1. 이 인물이 '주전론'인지 '주화론'인지 명확히 분류하세요.\n\
         2. 핵심 주장, 명분과 실리, 남한산성에서의 언행이나 전후의 결과를 기준으로 설명하세요.";

const GAEHWA_CATEGORIES: &[(&str, &str)] = &[
    ("개화파", "서양의 기술과 제도를 받아들여 근대 국가로 개혁하자는 세력 (예: 김옥균, 박영효, 김홍집)"),
    ("위정척사파", "성리학 질서를 지키고 서양 문물과 통상을 배척한 세력 (예: 이항로, 최익현)"),
];

const GORYEO_CATEGORIES: &[(&str, &str)] = &[
    ("권문세족", "음서로 관직을 독점하고 대농장을 소유한 친원 성향의 보수적 기득권층 (예: 이인임, 염제신)"),
    ("신진사대부", "성리학을 바탕으로 과거를 통해 등장한 지방 향리 출신 지식인층, 친명 (예: 정몽주, 정도전)"),
    ("신흥무인세력", "홍건적과 왜구를 격퇴하며 성장해 신진사대부와 결탁한 무장 세력 (예: 최영, 이성계)"),
];

const SADAEBU_CATEGORIES: &[(&str, &str)] = &[
    ("온건파 사대부", "고려 왕조 유지와 점진적 개혁, 조선 건국 반대 (예: 정몽주, 이색, 길재)"),
    ("급진파 사대부", "역성혁명과 급진적 개혁, 조선 건국 주도 (예: 정도전, 조준, 권근)"),
];

const BYEONGJA_CATEGORIES: &[(&str, &str)] = &[
    ("주전론", "청과의 화친을 거부하고 대의명분을 지켜 끝까지 싸우자는 척화파 (예: 김상헌, 삼학사)"),
    ("주화론", "전쟁을 멈추고 청과 화친하여 종묘사직을 보존하자는 입장 (예: 최명길)"),
];

const INDEPENDENCE_CATEGORIES: &[(&str, &str)] = &[
    ("무장투쟁론", "독립군을 조직해 일제와 무력으로 싸우자는 노선 (예: 홍범도, 김좌진)"),
    ("외교독립론", "열강과 국제 사회에 호소해 독립을 얻자는 노선 (예: 이승만)"),
    ("실력양성론", "교육과 산업으로 민족의 실력을 먼저 기르자는 노선 (예: 안창호)"),
    ("의열투쟁", "요인 암살과 기관 파괴로 일제에 직접 타격을 가한 활동 (예: 안중근, 윤봉길)"),
    ("친일파", "일제의 식민 지배에 협력한 인물 (예: 이완용)"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use sahak_common::Grounding;

    #[test]
    fn every_page_has_a_valid_preset() {
        for id in PageId::ALL {
            let preset = PagePreset::for_page(id).unwrap();
            assert_eq!(preset.id, id);
            let n = preset.vocabulary.categories().len();
            assert!((2..=6).contains(&n), "{id}: {n}");
        }
    }

    #[test]
    fn page_ids_round_trip_through_strings() {
        for id in PageId::ALL {
            assert_eq!(id.to_string().parse::<PageId>().unwrap(), id);
        }
        assert_eq!(" Goryeo-Elite ".parse::<PageId>().unwrap(), PageId::GoryeoElite);
        assert!(matches!(
            "joseon".parse::<PageId>(),
            Err(ClassifyError::UnknownPage(_))
        ));
    }

    #[test]
    fn presets_carry_the_page_parameters() {
        let gaehwa = PagePreset::for_page(PageId::Gaehwa).unwrap();
        assert_eq!(gaehwa.template.label_tag(), "결론");
        assert_eq!(gaehwa.template.snippet_limit(), Some(2500));
        assert!(!gaehwa.memoize_classification);

        let goryeo = PagePreset::for_page(PageId::GoryeoElite).unwrap();
        assert_eq!(goryeo.vocabulary.fallback(), "기타/미분류");
        assert_eq!(
            goryeo.source,
            SourceKind::HistoryDb(HistoryDbQuery { limit: 15, take: 3, min_chars: 0 })
        );
        assert!(goryeo.memoize_classification);

        let independence = PagePreset::for_page(PageId::Independence).unwrap();
        assert_eq!(independence.source, SourceKind::EncyKorea);
        assert_eq!(independence.template.snippet_limit(), None);
    }

    #[test]
    fn rendered_prompts_demand_the_label_line() {
        for id in PageId::ALL {
            let preset = PagePreset::for_page(id).unwrap();
            let tag = preset.template.label_tag();
            for snippet in [Some("사료 본문"), None] {
                let p = preset.template.render("홍길동", snippet);
                assert!(p.text.contains("'홍길동'"), "{id}");
                assert!(p.text.contains(&format!("첫 번째 줄: {tag}: [분류명]")), "{id}");
                let expected = if snippet.is_some() { Grounding::Snippet } else { Grounding::Knowledge };
                assert_eq!(p.grounding, expected);
            }
        }
    }

    #[test]
    fn guides_describe_exactly_the_vocabulary() {
        for id in PageId::ALL {
            let preset = PagePreset::for_page(id).unwrap();
            let described: Vec<&str> = preset.guide.iter().map(|(c, _)| *c).collect();
            assert_eq!(described, preset.vocabulary.categories(), "{id}");
        }
    }

    #[test]
    fn goryeo_pages_pin_their_model() {
        let pinned: Vec<PageId> = PageId::ALL
            .into_iter()
            .filter(|id| PagePreset::for_page(*id).unwrap().model.is_some())
            .collect();
        assert_eq!(pinned, vec![PageId::GoryeoElite, PageId::Sadaebu]);
        assert_eq!(
            PagePreset::for_page(PageId::GoryeoElite).unwrap().model,
            Some("gemini-2.5-flash")
        );
    }

    #[test]
    fn sources_build_for_every_page() {
        for id in PageId::ALL {
            let preset = PagePreset::for_page(id).unwrap();
            assert!(preset.build_source(&SourceOptions::default()).is_ok());
        }
    }
}
