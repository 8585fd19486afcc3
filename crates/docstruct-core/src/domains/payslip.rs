//! Payslip field extraction.
//!
//! Payslips are label-value documents: employee identity at the top,
//! earnings and deductions below. Every field resolves through the same
//! anchor/pattern strategy dispatch as the medical extractor.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{EngineConfig, ExtractedDocument, ExtractionMetadata, ParsingMethod};
use crate::money;
use crate::normalize::normalize;

use super::patterns;
use super::{resolve_field, Strategy};

/// Canonical payslip fields, in output order.
const FIELDS: &[&str] = &[
    "employee_name",
    "employee_id",
    "designation",
    "pay_period",
    "basic",
    "hra",
    "allowances",
    "gross_earnings",
    "provident_fund",
    "professional_tax",
    "income_tax",
    "total_deductions",
    "net_pay",
];

/// Tokens that end an anchor read because they belong to another field.
const STOP_WORDS: &[&str] = &[
    "emp", "employee", "designation", "department", "month", "period", "basic", "hra",
    "allowance", "gross", "pf", "provident", "professional", "tax", "tds", "deduction", "net",
    "pay", "salary", "bank", "uan", "date", "rs",
];

/// Extracts canonical payslip fields from OCR text.
#[derive(Debug, Clone, Default)]
pub struct PayslipExtractor;

impl PayslipExtractor {
    /// Create an extractor from configuration.
    pub fn new(_config: &EngineConfig) -> Self {
        Self
    }

    /// Extract all canonical fields. Never fails; unresolved fields stay
    /// empty and lower the confidence score.
    pub fn extract(&self, raw: &str) -> ExtractedDocument {
        let text = normalize(raw);
        let mut metadata = ExtractionMetadata::for_method(ParsingMethod::AnchorExtraction);
        let mut fields = Map::new();

        for field in FIELDS {
            fields.insert((*field).to_string(), Value::String(String::new()));
        }

        for (field, strategies) in Self::rules() {
            if let Some((value, source)) = resolve_field(&text, &strategies, STOP_WORDS) {
                // Amount-valued fields come back normalized from the
                // anchor path; normalize the regex fallback too.
                let value = if Self::is_amount_field(field) {
                    money::parse_amount(&value)
                        .map(money::format_amount)
                        .unwrap_or(value)
                } else {
                    value
                };
                fields.insert(field.to_string(), Value::String(value));
                metadata
                    .field_sources
                    .insert(field.to_string(), source.as_str().to_string());
            }
        }

        let filled = fields
            .values()
            .filter(|v| matches!(v, Value::String(s) if !s.is_empty()))
            .count();
        let confidence = (filled as f32 / FIELDS.len() as f32 * 100.0).clamp(0.0, 100.0);

        if confidence == 0.0 {
            metadata
                .warnings
                .push("no recognizable fields; document flagged invalid".to_string());
        }

        debug!("payslip: {}/{} fields resolved", filled, FIELDS.len());

        ExtractedDocument {
            fields,
            items: Vec::new(),
            confidence,
            metadata,
        }
    }

    fn is_amount_field(field: &str) -> bool {
        !matches!(
            field,
            "employee_name" | "employee_id" | "designation" | "pay_period"
        )
    }

    /// Per-field strategy lists, tried in order.
    fn rules() -> Vec<(&'static str, Vec<Strategy>)> {
        vec![
            (
                "employee_name",
                vec![Strategy::Anchor {
                    keywords: &["employee name", "emp name", "name of employee"],
                    take: 3,
                }],
            ),
            (
                "employee_id",
                vec![
                    Strategy::Anchor {
                        keywords: &["employee id", "employee code", "emp id", "emp code", "emp no"],
                        take: 1,
                    },
                    Strategy::Pattern(&patterns::EMPLOYEE_ID),
                ],
            ),
            (
                "designation",
                vec![Strategy::Anchor {
                    keywords: &["designation", "job title"],
                    take: 3,
                }],
            ),
            (
                "pay_period",
                vec![Strategy::Anchor {
                    keywords: &["pay period", "salary for the month of", "for the month of", "pay month"],
                    take: 2,
                }],
            ),
            (
                "basic",
                vec![Strategy::AnchorAmount {
                    keywords: &["basic pay", "basic salary", "basic"],
                }],
            ),
            (
                "hra",
                vec![Strategy::AnchorAmount {
                    keywords: &["house rent allowance", "hra"],
                }],
            ),
            (
                "allowances",
                vec![Strategy::AnchorAmount {
                    keywords: &["special allowance", "other allowances", "conveyance allowance", "allowances"],
                }],
            ),
            (
                "gross_earnings",
                vec![Strategy::AnchorAmount {
                    keywords: &["gross earnings", "gross salary", "gross pay", "total earnings"],
                }],
            ),
            (
                "provident_fund",
                vec![Strategy::AnchorAmount {
                    keywords: &["provident fund", "pf contribution", "epf"],
                }],
            ),
            (
                "professional_tax",
                vec![Strategy::AnchorAmount {
                    keywords: &["professional tax", "prof tax", "p.tax"],
                }],
            ),
            (
                "income_tax",
                vec![Strategy::AnchorAmount {
                    keywords: &["income tax", "tds"],
                }],
            ),
            (
                "total_deductions",
                vec![Strategy::AnchorAmount {
                    keywords: &["total deductions", "total deduction"],
                }],
            ),
            (
                "net_pay",
                vec![
                    Strategy::AnchorAmount {
                        keywords: &["net pay", "net salary", "take home", "net amount payable"],
                    },
                    Strategy::Pattern(&patterns::NET_PAY),
                ],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PayslipExtractor {
        PayslipExtractor::new(&EngineConfig::default())
    }

    const PAYSLIP: &str = "\
ACME SOFTWARE PVT LTD
Payslip for the month of March 2024

Employee Name: ANITA DESAI
Employee Code: EMP-0042
Designation: Senior Engineer

Earnings
Basic: 50,000.00
HRA: 20,000.00
Special Allowance: 10,000.00
Gross Earnings: 80,000.00

Deductions
Provident Fund: 6,000.00
Professional Tax: 200.00
Income Tax: 8,000.00
Total Deductions: 14,200.00

Net Pay: Rs. 65,800.00";

    #[test]
    fn test_identity_fields() {
        let doc = extractor().extract(PAYSLIP);

        assert_eq!(doc.fields["employee_name"], "ANITA DESAI");
        assert_eq!(doc.fields["employee_id"], "EMP-0042");
        assert_eq!(doc.fields["designation"], "Senior Engineer");
    }

    #[test]
    fn test_earnings_and_deductions() {
        let doc = extractor().extract(PAYSLIP);

        assert_eq!(doc.fields["basic"], "50000.00");
        assert_eq!(doc.fields["hra"], "20000.00");
        assert_eq!(doc.fields["gross_earnings"], "80000.00");
        assert_eq!(doc.fields["provident_fund"], "6000.00");
        assert_eq!(doc.fields["professional_tax"], "200.00");
        assert_eq!(doc.fields["net_pay"], "65800.00");
    }

    #[test]
    fn test_confidence_and_method() {
        let doc = extractor().extract(PAYSLIP);

        assert!(doc.confidence > 50.0);
        assert!(doc.confidence <= 100.0);
        assert_eq!(
            doc.metadata.parsing_method,
            Some(ParsingMethod::AnchorExtraction)
        );
    }

    #[test]
    fn test_empty_payslip_flagged_invalid() {
        let doc = extractor().extract("nothing useful");

        assert_eq!(doc.confidence, 0.0);
        assert!(!doc.metadata.warnings.is_empty());
        for field in FIELDS {
            assert_eq!(doc.fields[*field], "");
        }
    }
}
