// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::Sentiment;

/// 情感分类器特质
///
/// 个股新闻在提取后经此接口打标。纯函数契约：无副作用，
/// 平台的模型服务通过实现该特质接入。
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Sentiment;
}

/// 词典分类器
///
/// 基于财经关键词计数的保守默认实现，模型服务不可用时兜底。
/// 命中数持平或全无命中时归为中性。
#[derive(Debug, Default)]
pub struct LexiconClassifier;

const POSITIVE_TERMS: [&str; 8] = [
    "상승", "급등", "호재", "강세", "반등", "성장", "흑자", "최고치",
];
const NEGATIVE_TERMS: [&str; 8] = [
    "하락", "급락", "악재", "약세", "적자", "부진", "손실", "우려",
];

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Sentiment {
        let positive: usize = POSITIVE_TERMS.iter().map(|t| text.matches(t).count()).sum();
        let negative: usize = NEGATIVE_TERMS.iter().map(|t| text.matches(t).count()).sum();

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_terms_dominate() {
        let c = LexiconClassifier;
        assert_eq!(
            c.classify("주가 급등에 강세 지속, 실적 성장 기대"),
            Sentiment::Positive
        );
    }

    #[test]
    fn negative_terms_dominate() {
        let c = LexiconClassifier;
        assert_eq!(
            c.classify("영업 적자 확대 우려에 주가 급락"),
            Sentiment::Negative
        );
    }

    #[test]
    fn no_signal_is_neutral() {
        let c = LexiconClassifier;
        assert_eq!(c.classify("이사회 일정 공시"), Sentiment::Neutral);
    }
}
