//! Mapping of uploaded JSON and CSV data into validated tax requests

use crate::core::{AllowanceItem, InputError, TaxRequest};
use pitc_derive::CsvSchema;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Column description generated by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// One row of a tax upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, CsvSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxRecord {
    /// Gross income for the year
    pub total_income: Decimal,
    /// Tax already withheld at source
    pub wht: Decimal,
    /// Donation allowance claimed
    pub donation: Decimal,
}

impl From<TaxRecord> for TaxRequest {
    fn from(record: TaxRecord) -> Self {
        TaxRequest::new(
            record.total_income,
            record.wht,
            vec![AllowanceItem::donation(record.donation)],
        )
    }
}

/// Read a single JSON request and validate it
pub fn read_json_request<R: Read>(reader: R) -> Result<TaxRequest, InputError> {
    let request: TaxRequest =
        serde_json::from_reader(reader).map_err(|e| InputError::Json(e.to_string()))?;
    request.validate()?;
    Ok(request)
}

/// Read a tax upload. Rows keep their file order; any malformed or invalid row
/// rejects the whole upload.
pub fn read_csv_requests<R: Read>(reader: R) -> Result<Vec<TaxRequest>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| InputError::Csv(e.to_string()))?
        .clone();

    let mut requests = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|e| InputError::Csv(e.to_string()))?;
        let line = row.position().map_or(0, |p| p.line());

        let record: TaxRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| InputError::Csv(e.to_string()).at_line(line))?;
        let request = TaxRequest::from(record);
        request.validate().map_err(|e| e.at_line(line))?;
        requests.push(request);
    }

    if requests.is_empty() {
        return Err(InputError::Empty);
    }

    log::info!("Read {} csv records", requests.len());
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::allowance::AllowanceKind;
    use rust_decimal_macros::dec;

    #[test]
    fn rows_become_donation_requests() {
        let data = "totalIncome,wht,donation\n\
                    500000,0,0\n\
                    600000,40000,20000\n\
                    750000,50000,15000\n";

        let requests = read_csv_requests(data.as_bytes()).unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[1],
            TaxRequest::new(
                dec!(600000),
                dec!(40000),
                vec![AllowanceItem::donation(dec!(20000))]
            )
        );
        assert!(requests
            .iter()
            .all(|r| r.allowances.len() == 1 && r.allowances[0].kind == AllowanceKind::Donation));
    }

    #[test]
    fn decimal_values_and_spaces() {
        let data = "totalIncome, wht, donation\n500000.0, 0.0, 200000.50\n";
        let requests = read_csv_requests(data.as_bytes()).unwrap();
        assert_eq!(requests[0].total_income, dec!(500000));
        assert_eq!(requests[0].allowances[0].amount, dec!(200000.50));
    }

    #[test]
    fn header_only_is_empty() {
        let data = "totalIncome,wht,donation\n";
        assert_eq!(read_csv_requests(data.as_bytes()), Err(InputError::Empty));
    }

    #[test]
    fn malformed_number_rejected_with_line() {
        let data = "totalIncome,wht,donation\n500000,0,0\nabc,0,0\n";
        let err = read_csv_requests(data.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Line { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn negative_value_rejected_with_line() {
        let data = "totalIncome,wht,donation\n500000,-1,0\n";
        let err = read_csv_requests(data.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "line 2: wht must not be negative, got -1");
    }

    #[test]
    fn missing_column_rejected() {
        let data = "totalIncome,wht\n500000,0\n";
        assert!(read_csv_requests(data.as_bytes()).is_err());
    }

    #[test]
    fn json_request_validated() {
        let json = r#"{"totalIncome": -500, "wht": 0, "allowances": []}"#;
        assert!(matches!(
            read_json_request(json.as_bytes()),
            Err(InputError::Negative { .. })
        ));
    }

    #[test]
    fn json_request_with_unknown_allowance_rejected() {
        let json = r#"{"totalIncome": 500000, "wht": 0,
                       "allowances": [{"allowanceType": "insurance", "amount": 1}]}"#;
        assert!(matches!(read_json_request(json.as_bytes()), Err(InputError::Json(_))));
    }

    #[test]
    fn csv_schema_from_record() {
        assert_eq!(TaxRecord::csv_header(), "totalIncome,wht,donation");
        let schema = TaxRecord::csv_schema();
        assert_eq!(schema.len(), 3);
        assert!(schema.iter().all(|f| f.required));
        assert_eq!(schema[2].description, "Donation allowance claimed");
    }
}
