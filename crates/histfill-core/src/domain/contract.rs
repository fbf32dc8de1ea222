use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Upper-cased ticker as the gateway resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let mut chars = normalized.chars();

        match chars.next() {
            None => return Err(ValidationError::EmptySymbol),
            Some(ch) if !ch.is_ascii_alphabetic() => {
                return Err(ValidationError::SymbolInvalidStart { ch });
            }
            Some(_) => {}
        }

        if let Some((index, ch)) = normalized
            .char_indices()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-')))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len: normalized.len(),
                max: MAX_SYMBOL_LEN,
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

/// Gateway security type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityType {
    #[serde(rename = "IND")]
    Index,
    #[serde(rename = "STK")]
    Stock,
    #[serde(rename = "FUT")]
    Future,
    #[serde(rename = "CASH")]
    Forex,
}

impl SecurityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "IND",
            Self::Stock => "STK",
            Self::Future => "FUT",
            Self::Forex => "CASH",
        }
    }
}

impl Display for SecurityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instrument reference sent with every historical request.
///
/// Built once per run and never mutated; only the fields the gateway needs to
/// resolve a non-derivative contract are carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub symbol: Symbol,
    pub sec_type: SecurityType,
    pub exchange: String,
    pub currency: String,
}

impl Contract {
    pub fn new(
        symbol: Symbol,
        sec_type: SecurityType,
        exchange: impl AsRef<str>,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let exchange = exchange.as_ref().trim().to_ascii_uppercase();
        if exchange.is_empty() {
            return Err(ValidationError::EmptyExchange);
        }

        Ok(Self {
            symbol,
            sec_type,
            exchange,
            currency: validate_currency_code(currency.as_ref())?,
        })
    }

    /// USD-denominated index listed on `exchange`.
    pub fn index(symbol: &str, exchange: &str) -> Result<Self, ValidationError> {
        Self::new(Symbol::parse(symbol)?, SecurityType::Index, exchange, "USD")
    }
}

impl Default for Contract {
    /// CBOE volatility index.
    fn default() -> Self {
        Self {
            symbol: Symbol(String::from("VIX")),
            sec_type: SecurityType::Index,
            exchange: String::from("CBOE"),
            currency: String::from("USD"),
        }
    }
}

impl Display for Contract {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}@{}", self.sec_type, self.symbol, self.exchange)
    }
}

pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    if normalized.len() != 3 || !normalized.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }
    Ok(normalized)
}
