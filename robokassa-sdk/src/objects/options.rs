use serde::{Deserialize, Serialize};

/// Language of the Robokassa payment page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Culture {
    En,
    Ru,
}

impl Culture {
    pub fn as_str(self) -> &'static str {
        match self {
            Culture::En => "en",
            Culture::Ru => "ru",
        }
    }
}

/// Currency the shop quotes `OutSum` in; the gateway converts to rubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutSumCurrency {
    Usd,
    Eur,
    Kzt,
}

impl OutSumCurrency {
    pub fn as_str(self) -> &'static str {
        match self {
            OutSumCurrency::Usd => "USD",
            OutSumCurrency::Eur => "EUR",
            OutSumCurrency::Kzt => "KZT",
        }
    }
}

impl std::fmt::Display for OutSumCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Culture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
