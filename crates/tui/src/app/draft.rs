use api_types::transaction::{Category, TransactionNew};
use chrono::NaiveDate;
use thiserror::Error;

/// Date format shown and accepted in the form.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error(
        "1 or more fields lack required information. Make sure you have entered a valid Amount, picked a Category, and a Date."
    )]
    Incomplete,
    #[error("Amount must be a number greater than 0.")]
    InvalidAmount,
    #[error("Date must be a real calendar date (DD/MM/YYYY).")]
    InvalidDate,
}

/// Unsaved form contents. Text fields keep exactly what the user typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub amount: String,
    pub category: Option<Category>,
    pub description: String,
    pub date: String,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the draft and builds the create payload.
    ///
    /// Missing fields are reported before malformed ones.
    pub fn validate(&self) -> Result<TransactionNew, DraftError> {
        let amount_raw = self.amount.trim();
        let date_raw = self.date.trim();
        let Some(category) = self.category else {
            return Err(DraftError::Incomplete);
        };
        if amount_raw.is_empty() || date_raw.is_empty() {
            return Err(DraftError::Incomplete);
        }

        let amount = parse_amount(amount_raw).ok_or(DraftError::InvalidAmount)?;
        let date = parse_date(date_raw).ok_or(DraftError::InvalidDate)?;

        Ok(TransactionNew {
            amount,
            category,
            description: self.description.trim().to_string(),
            date,
        })
    }

    /// Cycles the category forward, starting from the first one.
    pub fn next_category(&mut self) {
        self.category = Some(match self.category {
            Some(category) => category.next(),
            None => Category::ALL[0],
        });
    }

    /// Cycles the category backward, starting from the last one.
    pub fn prev_category(&mut self) {
        self.category = Some(match self.category {
            Some(category) => category.prev(),
            None => Category::ALL[Category::ALL.len() - 1],
        });
    }
}

/// Accepts `.` or `,` as decimal separator. Only finite values > 0 pass.
fn parse_amount(raw: &str) -> Option<f64> {
    let normalized = raw.replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DISPLAY_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Characters the amount field accepts while typing.
pub fn accepts_amount_char(current: &str, ch: char) -> bool {
    match ch {
        '0'..='9' => true,
        '.' | ',' => !current.contains(['.', ',']),
        _ => false,
    }
}

/// Characters the date field accepts while typing.
pub fn accepts_date_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '/' || ch == '-'
}
