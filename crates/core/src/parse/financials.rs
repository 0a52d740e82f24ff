use crate::domain::contract::{LlmFinancials, LlmIndicator};
use crate::domain::financials::FinancialSnapshot;
use crate::error::InsightError;
use crate::parse::json::parse_payload;
use serde_json::Value;

/// Parses a `{"indicators": [...], "dataAsOf": ..., "dataComment": ...}`
/// response. Malformed indicator entries are skipped, but at least one must
/// survive.
pub fn parse_financial_json(text: &str) -> Result<FinancialSnapshot, InsightError> {
    let (payload, value) = parse_payload(text)?;
    if !value.is_object() {
        return Err(InsightError::malformed(
            "expected a JSON object with an indicators array",
            payload,
        ));
    }

    let financials: LlmFinancials = serde_json::from_value(value)
        .map_err(|e| InsightError::malformed(e.to_string(), payload))?;

    let total = financials.indicators.len();
    let indicators: Vec<_> = financials
        .indicators
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry): (usize, Value)| {
            let parsed = serde_json::from_value::<LlmIndicator>(entry)
                .map_err(anyhow::Error::from)
                .and_then(LlmIndicator::validate_and_into_indicator);
            match parsed {
                Ok(indicator) => Some(indicator),
                Err(e) => {
                    tracing::warn!(index, error = %e, "dropping malformed financial indicator");
                    None
                }
            }
        })
        .collect();

    if indicators.is_empty() {
        return Err(InsightError::malformed(
            format!("no usable financial indicators ({total} received)"),
            payload,
        ));
    }

    Ok(FinancialSnapshot {
        indicators,
        data_as_of: financials.data_as_of.filter(|s| !s.trim().is_empty()),
        data_comment: financials.data_comment.filter(|s| !s.trim().is_empty()),
        sources: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::financials::IndicatorValue;

    #[test]
    fn parses_indicators_with_mixed_values() {
        let text = r#"Here is the data:
{
  "indicators": [
    {"id": "pe_ratio", "name": "P/E Ratio", "value": 28.4, "notes": "TTM"},
    {"id": "market_cap", "name": "Market Cap", "value": "3.1T USD"}
  ],
  "dataAsOf": "2024-05-01",
  "dataComment": "Figures from the latest filing."
}"#;
        let snapshot = parse_financial_json(text).unwrap();

        assert_eq!(snapshot.indicators.len(), 2);
        assert_eq!(snapshot.indicators[0].value, IndicatorValue::Number(28.4));
        assert_eq!(
            snapshot.indicators[1].value,
            IndicatorValue::Text("3.1T USD".to_string())
        );
        assert_eq!(snapshot.data_as_of.as_deref(), Some("2024-05-01"));
        assert!(snapshot.sources.is_empty());
    }

    #[test]
    fn skips_malformed_indicators() {
        let text = r#"{"indicators": [{"name": "EPS"}, "junk", {"name": "ROE", "value": "18%"}]}"#;
        let snapshot = parse_financial_json(text).unwrap();
        assert_eq!(snapshot.indicators.len(), 1);
        assert_eq!(snapshot.indicators[0].id, "roe");
        assert_eq!(snapshot.data_as_of, None);
    }

    #[test]
    fn empty_indicator_list_is_malformed() {
        for text in [
            r#"{"indicators": []}"#,
            r#"{"indicators": [{"name": "EPS"}]}"#,
        ] {
            assert!(matches!(
                parse_financial_json(text),
                Err(InsightError::MalformedPayload { .. })
            ));
        }
    }

    #[test]
    fn wrong_top_level_shape_is_malformed() {
        for text in [r#"[{"name": "EPS", "value": 1}]"#, r#"{"data": []}"#] {
            assert!(matches!(
                parse_financial_json(text),
                Err(InsightError::MalformedPayload { .. })
            ));
        }
    }

    #[test]
    fn malformed_errors_quote_the_payload_as_written() {
        for (text, expected) in [
            ("```json\n{ \"data\" : [] }\n```", r#"{ "data" : [] }"#),
            (
                "Result: {\"indicators\" : [ {\"name\": \"EPS\"} ]}",
                r#"{"indicators" : [ {"name": "EPS"} ]}"#,
            ),
        ] {
            let err = parse_financial_json(text).unwrap_err();
            let InsightError::MalformedPayload { excerpt, .. } = &err else {
                panic!("unexpected error: {err:?}");
            };
            assert_eq!(excerpt, expected);
        }
    }

    #[test]
    fn prose_only_is_missing_payload() {
        assert!(matches!(
            parse_financial_json("Data unavailable for this ticker."),
            Err(InsightError::MissingPayload { .. })
        ));
    }
}
