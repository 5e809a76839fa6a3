use chrono::NaiveDate;

/// A single parsed row from the card statement
#[derive(Debug, Clone)]
pub(crate) struct Transaction {
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) amount: f32,
}

impl Transaction {
    pub(crate) fn new(date: NaiveDate, description: &str, amount: f32) -> Transaction {
        let description = description.trim().replace('\n', " ");
        Transaction {
            date,
            description,
            amount,
        }
    }

    /// Negative amounts are charges; positive ones are payments or refunds.
    pub(crate) fn is_charge(&self) -> bool {
        self.amount < 0.0
    }
}
