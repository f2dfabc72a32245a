use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::transaction::TransactionType;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Category {
    // Income
    Salary,
    Freelance,
    Investments,
    Sales,
    Bonus,
    OtherIncome,

    // Expense
    Food,
    Transport,
    Housing,
    Health,
    Education,
    Entertainment,
    Shopping,
    Bills,
    Clothing,
    Technology,
    OtherExpense,
}

impl Category {
    pub(crate) const ALL: [Category; 17] = [
        Category::Salary,
        Category::Freelance,
        Category::Investments,
        Category::Sales,
        Category::Bonus,
        Category::OtherIncome,
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Health,
        Category::Education,
        Category::Entertainment,
        Category::Shopping,
        Category::Bills,
        Category::Clothing,
        Category::Technology,
        Category::OtherExpense,
    ];

    pub(crate) fn is_income(&self) -> bool {
        matches!(self,
            Category::Salary | Category::Freelance | Category::Investments |
            Category::Sales | Category::Bonus | Category::OtherIncome)
    }

    /// Whether this category can be used for a transaction of the given type
    pub(crate) fn is_compatible(&self, transaction_type: TransactionType) -> bool {
        match transaction_type {
            TransactionType::Income => self.is_income(),
            TransactionType::Expense => !self.is_income(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::Freelance => "Freelance",
            Category::Investments => "Investments",
            Category::Sales => "Sales",
            Category::Bonus => "Bonus",
            Category::OtherIncome => "Other (Income)",
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Housing => "Housing",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Clothing => "Clothing",
            Category::Technology => "Technology",
            Category::OtherExpense => "Other (Expense)",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Freelance => "freelance",
            Category::Investments => "investments",
            Category::Sales => "sales",
            Category::Bonus => "bonus",
            Category::OtherIncome => "other_income",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Health => "health",
            Category::Education => "education",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::Bills => "bills",
            Category::Clothing => "clothing",
            Category::Technology => "technology",
            Category::OtherExpense => "other_expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts either the display name ("Other (Expense)") or the key ("other_expense"), ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL.iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.key().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown category '{s}'"))
    }
}
