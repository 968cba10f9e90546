//! Caption style registry.
//!
//! Each style maps a variant name to the instruction sent to the vision
//! model. Character and length limits are part of the instruction; they are
//! only enforced in code when strict mode is requested (see
//! [`CaptionStyle::enforce`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum caption length requested from the model, in characters.
pub const MAX_CAPTION_CHARS: usize = 15;

/// Available caption styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CaptionStyle {
    /// Short Korean thumbnail title
    #[default]
    #[serde(rename = "v1")]
    Title,
    /// Punchy shorts title restricted to Hangul syllables and spaces
    #[serde(rename = "v2")]
    PureHangul,
}

impl CaptionStyle {
    /// All registered styles.
    pub const ALL: &'static [CaptionStyle] = &[CaptionStyle::Title, CaptionStyle::PureHangul];

    /// Resolve a variant name. Unknown names fall back to the default style.
    pub fn from_variant(variant: &str) -> Self {
        match variant.trim().to_lowercase().as_str() {
            "v2" => CaptionStyle::PureHangul,
            _ => CaptionStyle::Title,
        }
    }

    /// Variant name as it appears in queue messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionStyle::Title => "v1",
            CaptionStyle::PureHangul => "v2",
        }
    }

    /// Instruction sent alongside the sampled frame.
    pub fn prompt(&self) -> &'static str {
        match self {
            CaptionStyle::Title => concat!(
                "이 이미지를 보고 ",
                "영상 썸네일에 쓸 짧은 한국어 제목을 만들어라. ",
                "최대 15자. 설명 금지. 문장부호 금지."
            ),
            CaptionStyle::PureHangul => concat!(
                "이 이미지를 보고 ",
                "쇼츠 영상에 어울리는 강렬하고 눈에 띄는 한국어 제목을 만들어라. ",
                "반드시 순수 한글만 사용하라. ",
                "이모지, 특수문자, 전각문자, 영어, 숫자 절대 사용 금지. ",
                "공백은 허용한다. ",
                "최대 15자. 설명 금지. 문장부호 금지."
            ),
        }
    }

    /// Maximum caption length in characters.
    pub fn max_chars(&self) -> usize {
        MAX_CAPTION_CHARS
    }

    /// Whether `c` belongs to this style's character set.
    pub fn allows_char(&self, c: char) -> bool {
        match self {
            CaptionStyle::Title => true,
            CaptionStyle::PureHangul => c == ' ' || is_hangul_syllable(c),
        }
    }

    /// Programmatically apply the style's character set and length limit.
    ///
    /// Disallowed characters are dropped, the result is cut to
    /// [`max_chars`](Self::max_chars) characters and trimmed.
    pub fn enforce(&self, text: &str) -> String {
        let filtered: String = text.chars().filter(|c| self.allows_char(*c)).collect();
        let truncated: String = filtered.trim().chars().take(self.max_chars()).collect();
        truncated.trim_end().to_string()
    }
}

impl fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Precomposed Hangul syllables block (가..힣).
fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_variant() {
        assert_eq!(CaptionStyle::from_variant("v1"), CaptionStyle::Title);
        assert_eq!(CaptionStyle::from_variant("v2"), CaptionStyle::PureHangul);
        assert_eq!(CaptionStyle::from_variant(" V2 "), CaptionStyle::PureHangul);
        assert_eq!(CaptionStyle::from_variant("dramatic"), CaptionStyle::Title);
        assert_eq!(CaptionStyle::from_variant(""), CaptionStyle::Title);
    }

    #[test]
    fn test_variant_names_round_trip() {
        for style in CaptionStyle::ALL {
            assert_eq!(CaptionStyle::from_variant(style.as_str()), *style);
        }
    }

    #[test]
    fn test_prompts_are_distinct() {
        assert_ne!(CaptionStyle::Title.prompt(), CaptionStyle::PureHangul.prompt());
        assert!(CaptionStyle::PureHangul.prompt().contains("순수 한글"));
    }

    #[test]
    fn test_pure_hangul_charset() {
        let style = CaptionStyle::PureHangul;
        assert!(style.allows_char('멋'));
        assert!(style.allows_char(' '));
        assert!(!style.allows_char('A'));
        assert!(!style.allows_char('7'));
        assert!(!style.allows_char('!'));
        // Compatibility jamo are not syllables
        assert!(!style.allows_char('ㅋ'));
    }

    #[test]
    fn test_enforce_filters_and_truncates_by_chars() {
        let style = CaptionStyle::PureHangul;
        assert_eq!(style.enforce("멋진 순간 2024!!"), "멋진 순간");

        let long = "가".repeat(40);
        let enforced = style.enforce(&long);
        assert_eq!(enforced.chars().count(), MAX_CAPTION_CHARS);
    }

    #[test]
    fn test_enforce_leading_space_does_not_use_up_limit() {
        let style = CaptionStyle::PureHangul;
        let reply = format!("A {}", "가".repeat(20));
        assert_eq!(style.enforce(&reply), "가".repeat(MAX_CAPTION_CHARS));

        // Trailing space at the cut point is dropped too
        let reply = format!("{} 나다", "가".repeat(14));
        assert_eq!(style.enforce(&reply), "가".repeat(14));
    }

    #[test]
    fn test_enforce_title_keeps_charset() {
        assert_eq!(CaptionStyle::Title.enforce("Top 10 순간"), "Top 10 순간");
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let json = serde_json::to_string(&CaptionStyle::PureHangul).unwrap();
        assert_eq!(json, "\"v2\"");
    }
}
