//! Which fields of each entity kind are encrypted before leaving the client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

const NAME_AMOUNT_DESCRIPTION: &[&str] = &["name", "amount", "description"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Income,
    Expense,
    Investment,
    CreditCard,
    Loan,
    FutureBomb,
    VariablePlan,
    VariableActual,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Income,
        EntityKind::Expense,
        EntityKind::Investment,
        EntityKind::CreditCard,
        EntityKind::Loan,
        EntityKind::FutureBomb,
        EntityKind::VariablePlan,
        EntityKind::VariableActual,
    ];

    pub fn sensitive_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::CreditCard => &["name", "limit", "description"],
            EntityKind::VariablePlan => &["name", "planned", "description"],
            EntityKind::Income
            | EntityKind::Expense
            | EntityKind::Investment
            | EntityKind::Loan
            | EntityKind::FutureBomb
            | EntityKind::VariableActual => NAME_AMOUNT_DESCRIPTION,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Income => "income",
            EntityKind::Expense => "expense",
            EntityKind::Investment => "investment",
            EntityKind::CreditCard => "creditCard",
            EntityKind::Loan => "loan",
            EntityKind::FutureBomb => "futureBomb",
            EntityKind::VariablePlan => "variablePlan",
            EntityKind::VariableActual => "variableActual",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CryptoError;

    /// Accepts `creditCard`, `credit_card` and `credit-card` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| CryptoError::UnknownEntityKind(s.to_string()))
    }
}
