//! Common regex patterns for anchor-domain field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice/bill number patterns
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)(?:bill|invoice|receipt|memo)\s*(?:no|num|number|#)?\s*[:.\-]?\s*([A-Za-z0-9][A-Za-z0-9/\-]*)"
    )
    .unwrap();

    // Date patterns; group 1 is the full date
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2}[./\-]\d{1,2}[./\-](?:\d{4}|\d{2}))\b"
    )
    .unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4}[./\-]\d{1,2}[./\-]\d{1,2})\b"
    )
    .unwrap();

    pub static ref LABELED_DATE: Regex = Regex::new(
        r"(?i)(?:date|dt|dated)\s*[:.\-]?\s*(\d{1,2}[./\-]\d{1,2}[./\-](?:\d{4}|\d{2}))"
    )
    .unwrap();

    // Indian mobile number (10 digits starting 6-9, optional country code)
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+91[\s\-]?)?\b([6-9]\d{9})\b"
    )
    .unwrap();

    // GST registration number
    pub static ref GSTIN: Regex = Regex::new(
        r"\b(\d{2}[A-Z]{5}\d{4}[A-Z]\d[A-Z0-9]{2})\b"
    )
    .unwrap();

    // Labeled totals
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)(?:grand\s+total|net\s+amount|amount\s+payable|total\s+amount|total)\s*[:.\-]?\s*(?:rs\.?|inr|₹)?\s*(\d[\d,]*(?:\.\d{1,2})?)"
    )
    .unwrap();

    pub static ref DISCOUNT: Regex = Regex::new(
        r"(?i)(?:discount|less)\s*[:.\-]?\s*(?:rs\.?|inr|₹)?\s*(\d[\d,]*(?:\.\d{1,2})?)"
    )
    .unwrap();

    // Payslip-specific labeled amounts
    pub static ref NET_PAY: Regex = Regex::new(
        r"(?i)(?:net\s+pay(?:able)?|net\s+salary|take\s+home)\s*[:.\-]?\s*(?:rs\.?|inr|₹)?\s*(\d[\d,]*(?:\.\d{1,2})?)"
    )
    .unwrap();

    // Employee code: letters and digits, common payslip id shapes
    pub static ref EMPLOYEE_ID: Regex = Regex::new(
        r"(?i)(?:emp(?:loyee)?\s*(?:id|code|no)\.?)\s*[:.\-]?\s*([A-Za-z0-9/\-]{2,15})"
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number() {
        let caps = INVOICE_NUMBER.captures("Bill No: INV-2024/118").unwrap();
        assert_eq!(&caps[1], "INV-2024/118");
    }

    #[test]
    fn test_phone() {
        let caps = PHONE.captures("Ph.No. 9876543210").unwrap();
        assert_eq!(&caps[1], "9876543210");
        assert!(PHONE.captures("12345").is_none());
    }

    #[test]
    fn test_labeled_date() {
        let caps = LABELED_DATE.captures("Date: 15/01/2024").unwrap();
        assert_eq!(&caps[1], "15/01/2024");
    }

    #[test]
    fn test_total_amount() {
        let caps = TOTAL_AMOUNT.captures("Grand Total: Rs. 1,234.50").unwrap();
        assert_eq!(&caps[1], "1,234.50");
    }

    #[test]
    fn test_gstin() {
        let caps = GSTIN.captures("GSTIN 27AAPFU0939F1ZV").unwrap();
        assert_eq!(&caps[1], "27AAPFU0939F1ZV");
    }
}
