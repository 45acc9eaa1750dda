//! 确定性风险分级规则
//!
//! 关键词组命中即产生一条 Finding；严重组（do not travel / evacuation / terror / curfew …）→ Avoid，
//! 中等组（protest / strike / outbreak / advisory / storm …）→ Caution；多组命中取最严重。

use crate::core::{Finding, Headline, RiskClassification};

#[derive(Debug, Clone, Copy)]
pub struct RiskRule {
    pub signal: &'static str,
    pub keywords: &'static [&'static str],
    pub severity: RiskClassification,
}

/// 本地新闻：动乱 / 暴力、公共卫生、出行中断
pub const NEWS_RULES: &[RiskRule] = &[
    RiskRule {
        signal: "violence",
        keywords: &["terror", "bomb", "shooting", "riot", "curfew", "evacuation", "evacuate"],
        severity: RiskClassification::Avoid,
    },
    RiskRule {
        signal: "civil unrest",
        keywords: &["protest", "strike", "bandh", "clash", "unrest", "demonstration", "agitation"],
        severity: RiskClassification::Caution,
    },
    RiskRule {
        signal: "health notice",
        keywords: &["outbreak", "epidemic", "dengue", "cholera", "health alert"],
        severity: RiskClassification::Caution,
    },
    RiskRule {
        signal: "disruption",
        keywords: &["storm", "cyclone", "flood", "landslide", "disruption", "shutdown", "suspended"],
        severity: RiskClassification::Caution,
    },
];

/// 官方提示：在效提示、卫生通告、入境限制
pub const ADVISORY_RULES: &[RiskRule] = &[
    RiskRule {
        signal: "active advisory",
        keywords: &["do not travel", "evacuation", "state of emergency", "curfew", "terror", "martial law"],
        severity: RiskClassification::Avoid,
    },
    RiskRule {
        signal: "travel advisory",
        keywords: &["advisory", "travel warning", "reconsider travel", "alert issued", "red alert", "orange alert"],
        severity: RiskClassification::Caution,
    },
    RiskRule {
        signal: "health notice",
        keywords: &["outbreak", "epidemic", "health advisory", "quarantine"],
        severity: RiskClassification::Caution,
    },
    RiskRule {
        signal: "entry requirement",
        keywords: &["entry restriction", "border closed", "permit required", "visa suspended"],
        severity: RiskClassification::Caution,
    },
];

fn starts_word(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .next_back()
        .map_or(true, |prev| !prev.is_alphanumeric())
}

/// 词首匹配（允许复数等后缀），大小写不敏感；调用方传入小写文本
pub(crate) fn contains_term(text: &str, term: &str) -> bool {
    text.match_indices(term).any(|(idx, _)| starts_word(text, idx))
}

/// 整词匹配，仅允许复数后缀 s / es；调用方传入小写文本
pub(crate) fn contains_word(text: &str, term: &str) -> bool {
    text.match_indices(term).any(|(idx, _)| {
        let rest = &text[idx + term.len()..];
        let rest = rest
            .strip_prefix("es")
            .or_else(|| rest.strip_prefix('s'))
            .filter(|r| !r.starts_with(char::is_alphanumeric))
            .unwrap_or(rest);
        starts_word(text, idx) && !rest.starts_with(char::is_alphanumeric)
    })
}

/// 对单条头条应用规则，返回命中信号与最高严重度
pub fn assess(headline: &Headline, rules: &[RiskRule]) -> Option<Finding> {
    let text = format!("{} {}", headline.title, headline.snippet).to_lowercase();
    let hits: Vec<&RiskRule> = rules
        .iter()
        .filter(|rule| rule.keywords.iter().any(|kw| contains_term(&text, kw)))
        .collect();
    let severity = RiskClassification::worst(hits.iter().map(|rule| rule.severity))?;
    Some(Finding {
        headline: headline.clone(),
        signals: hits.iter().map(|rule| rule.signal.to_string()).collect(),
        severity,
    })
}

/// 对一组头条分级：最坏情况规则；无命中为 Safe
pub fn classify(headlines: &[Headline], rules: &[RiskRule]) -> (RiskClassification, Vec<Finding>) {
    let findings: Vec<Finding> = headlines.iter().filter_map(|h| assess(h, rules)).collect();
    let classification =
        RiskClassification::worst(findings.iter().map(|f| f.severity)).unwrap_or(RiskClassification::Safe);
    (classification, findings)
}

/// 分级对应的出行建议
pub fn actions_for(classification: RiskClassification) -> Vec<String> {
    let actions: &[&str] = match classification {
        RiskClassification::Safe => &["Maintain standard travel awareness and keep emergency numbers handy"],
        RiskClassification::Caution => &[
            "Avoid protest sites and large gatherings",
            "Keep bookings flexible and refundable",
            "Monitor local news daily during the trip",
        ],
        RiskClassification::Avoid => &[
            "Postpone non-essential travel",
            "Follow official curfew or evacuation instructions",
            "Register with your embassy or consulate",
        ],
    };
    actions.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specialists::testing::headline;

    #[test]
    fn test_no_signal_is_safe() {
        let (class, findings) = classify(&[headline("Beach festival draws crowds")], NEWS_RULES);
        assert_eq!(class, RiskClassification::Safe);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_worst_case_across_headlines() {
        let headlines = [
            headline("Farmers protest near city centre"),
            headline("Beach festival draws crowds"),
            headline("Curfew imposed after clashes"),
        ];
        let (class, findings) = classify(&headlines, NEWS_RULES);
        assert_eq!(class, RiskClassification::Avoid);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, RiskClassification::Caution);
        assert!(findings[1].signals.contains(&"violence".to_string()));
        assert!(findings[1].signals.contains(&"civil unrest".to_string()));
    }

    #[test]
    fn test_word_start_matching() {
        assert!(contains_term("transport strikes planned", "strike"));
        assert!(!contains_term("a brainstorm session", "storm"));
        assert!(contains_word("two eggs, scrambled", "egg"));
        assert!(contains_word("roasted potatoes", "potato"));
        assert!(contains_word("onion-free kachori", "onion"));
        assert!(!contains_word("smoky eggplant bharta", "egg"));
        assert!(!contains_word("speeches limited to 5 minutes", "nut"));
        assert!(!contains_word("extra vegetables please", "veg"));
        let (class, _) = classify(&[headline("Government issues Do Not Travel notice")], ADVISORY_RULES);
        assert_eq!(class, RiskClassification::Avoid);
    }

    #[test]
    fn test_actions_escalate() {
        assert_eq!(actions_for(RiskClassification::Safe).len(), 1);
        assert!(actions_for(RiskClassification::Avoid)[0].contains("Postpone"));
    }
}
