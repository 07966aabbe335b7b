use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, de};

pub mod category {
    use super::*;

    /// Spending category of a transaction.
    ///
    /// The wire value is the variant name (`"DebtRepayment"`), the label is
    /// what the UI shows (`"Debt Repayment"`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum Category {
        Clothing,
        DebtRepayment,
        DiningOut,
        Entertainment,
        Groceries,
        Housing,
        Insurance,
        Other,
        Transportation,
        Travel,
        Utilities,
    }

    impl Category {
        pub const ALL: [Category; 11] = [
            Self::Clothing,
            Self::DebtRepayment,
            Self::DiningOut,
            Self::Entertainment,
            Self::Groceries,
            Self::Housing,
            Self::Insurance,
            Self::Other,
            Self::Transportation,
            Self::Travel,
            Self::Utilities,
        ];

        /// Returns the value stored by the server.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Clothing => "Clothing",
                Self::DebtRepayment => "DebtRepayment",
                Self::DiningOut => "DiningOut",
                Self::Entertainment => "Entertainment",
                Self::Groceries => "Groceries",
                Self::Housing => "Housing",
                Self::Insurance => "Insurance",
                Self::Other => "Other",
                Self::Transportation => "Transportation",
                Self::Travel => "Travel",
                Self::Utilities => "Utilities",
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                Self::DebtRepayment => "Debt Repayment",
                Self::DiningOut => "Dining Out",
                other => other.as_str(),
            }
        }

        /// Next category in [`Category::ALL`], wrapping around.
        pub fn next(self) -> Self {
            let idx = self.position();
            Self::ALL[(idx + 1) % Self::ALL.len()]
        }

        /// Previous category in [`Category::ALL`], wrapping around.
        pub fn prev(self) -> Self {
            let idx = self.position();
            Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
        }

        fn position(self) -> usize {
            Self::ALL
                .iter()
                .position(|c| *c == self)
                .unwrap_or_default()
        }
    }
}

pub mod transaction {
    use super::*;

    pub use crate::category::Category;

    /// Identifier assigned by the server. Opaque to clients.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TransactionId(pub i64);

    impl std::fmt::Display for TransactionId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    /// A stored transaction as returned by `GET /transactions/`.
    ///
    /// Decoding is tolerant of what older clients managed to store:
    /// - `amount` may be a number, a numeric string or null; anything else
    ///   decodes as `None` and counts as zero in totals.
    /// - `date` may be `YYYY-MM-DD` or a full timestamp; timestamps keep
    ///   their local calendar date.
    /// - `description` may be null or missing.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: TransactionId,
        #[serde(default, deserialize_with = "lenient_amount")]
        pub amount: Option<f64>,
        pub category: Category,
        #[serde(default, deserialize_with = "nullable_string")]
        pub description: String,
        #[serde(deserialize_with = "lenient_date")]
        pub date: NaiveDate,
    }

    /// Payload of `POST /transactions/`.
    ///
    /// `date` is always serialized as `YYYY-MM-DD`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount: f64,
        pub category: Category,
        pub description: String,
        pub date: NaiveDate,
    }

    /// Parses a date as stored by the server.
    pub fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Local).date_naive());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|ts| ts.date())
    }

    fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Number(f64),
            Text(String),
            Other(de::IgnoredAny),
        }

        let amount = match Option::<RawAmount>::deserialize(deserializer)? {
            Some(RawAmount::Number(value)) => Some(value),
            Some(RawAmount::Text(text)) => text.trim().parse::<f64>().ok(),
            Some(RawAmount::Other(_)) | None => None,
        };
        Ok(amount.filter(|value| value.is_finite()))
    }

    fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_stored_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid transaction date `{raw}`")))
    }
}
