use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::contract::ReferralState;
use crate::model::{CustomerSize, DealCriteria, Proposal, Referral, ReferralStatus};

/// Errors that can occur when parsing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized action '{action}'")]
    UnrecognizedAction { line: usize, action: String },

    #[error("line {line}: unrecognized customer size '{value}'")]
    UnrecognizedSize { line: usize, value: String },

    #[error("line {line}: unrecognized deal criteria '{value}'")]
    UnrecognizedCriteria { line: usize, value: String },

    #[error("line {line}: approve missing deal criteria")]
    MissingCriteria { line: usize },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    action: String,
    referral: String,
    #[serde(default)]
    customer: String,
    #[serde(default)]
    branch: String,
    contact: Option<i64>,
    #[serde(default)]
    date: String,
    customer_size: Option<String>,
    deal_criteria: Option<String>,
    party: String,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    referral: String,
    status: String,
    customer: String,
    branch: String,
    partner: String,
    customer_size: String,
    deal_criteria: String,
    compensation: String,
}

fn parse_size(value: Option<String>, line: usize) -> Result<Option<CustomerSize>, CsvError> {
    match value {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|()| CsvError::UnrecognizedSize { line, value }),
    }
}

fn parse_criteria(value: Option<String>, line: usize) -> Result<DealCriteria, CsvError> {
    let value = value.ok_or(CsvError::MissingCriteria { line })?;
    value
        .parse()
        .map_err(|()| CsvError::UnrecognizedCriteria { line, value })
}

/// Read proposals from a csv file
pub fn read_proposals(
    path: impl AsRef<Path>,
) -> impl Iterator<Item = Result<Proposal, CsvError>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .expect("failed to open csv file");

    reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            match row.action.as_str() {
                "create" => {
                    let referral = Referral {
                        referral_id: row.referral,
                        customer_name: row.customer,
                        branch_id: row.branch,
                        contact_number: row.contact,
                        create_date: row.date,
                        status: ReferralStatus::Active,
                        deal_criteria: None,
                        customer_size: parse_size(row.customer_size, line)?,
                        partner_name: row.party.clone(),
                        compensation: None,
                    };
                    Ok(Proposal::Create {
                        referral,
                        counterparty: row.party,
                    })
                }
                "accept" => Ok(Proposal::Accept {
                    referral_id: row.referral,
                    counterparty: row.party,
                }),
                "approve" => Ok(Proposal::Approve {
                    referral_id: row.referral,
                    deal_criteria: parse_criteria(row.deal_criteria, line)?,
                    counterparty: row.party,
                }),
                "decline" => Ok(Proposal::Decline {
                    referral_id: row.referral,
                    counterparty: row.party,
                }),
                other => Err(CsvError::UnrecognizedAction {
                    line,
                    action: other.to_string(),
                }),
            }
        })
}

/// write referral heads to stdout in csv format
pub fn write_records<'a>(records: impl IntoIterator<Item = &'a ReferralState>) {
    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());

    for state in records {
        let referral = &state.referral;
        let row = OutputRow {
            referral: referral.referral_id.clone(),
            status: referral.status.to_string(),
            customer: referral.customer_name.clone(),
            branch: referral.branch_id.clone(),
            partner: referral.partner_name.clone(),
            customer_size: referral
                .customer_size
                .map(|size| size.to_string())
                .unwrap_or_default(),
            deal_criteria: referral
                .deal_criteria
                .map(|deal| deal.to_string())
                .unwrap_or_default(),
            compensation: referral.compensation.clone().unwrap_or_default(),
        };
        writer.serialize(&row).expect("failed to write csv row");
    }

    writer.flush().expect("failed to flush csv writer");
}
