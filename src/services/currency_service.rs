use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Devises acceptées pour les annonces et l'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Ron,
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    pub fn from_code(code: &str) -> Option<Currency> {
        match code.to_ascii_uppercase().as_str() {
            "RON" => Some(Currency::Ron),
            "EUR" => Some(Currency::Eur),
            "USD" => Some(Currency::Usd),
            "GBP" => Some(Currency::Gbp),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ron => "RON",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }
}

/// Table de change statique 4×4
/// rate(from, to) = combien de `to` pour 1 `from`
fn rate(from: Currency, to: Currency) -> Decimal {
    use Currency::*;

    match (from, to) {
        (Ron, Ron) => Decimal::ONE,
        (Ron, Eur) => Decimal::new(201, 3),  // 0.201
        (Ron, Usd) => Decimal::new(219, 3),  // 0.219
        (Ron, Gbp) => Decimal::new(172, 3),  // 0.172
        (Eur, Ron) => Decimal::new(4970, 3), // 4.970
        (Eur, Eur) => Decimal::ONE,
        (Eur, Usd) => Decimal::new(1090, 3), // 1.090
        (Eur, Gbp) => Decimal::new(856, 3),  // 0.856
        (Usd, Ron) => Decimal::new(4560, 3), // 4.560
        (Usd, Eur) => Decimal::new(917, 3),  // 0.917
        (Usd, Usd) => Decimal::ONE,
        (Usd, Gbp) => Decimal::new(785, 3),  // 0.785
        (Gbp, Ron) => Decimal::new(5810, 3), // 5.810
        (Gbp, Eur) => Decimal::new(1169, 3), // 1.169
        (Gbp, Usd) => Decimal::new(1274, 3), // 1.274
        (Gbp, Gbp) => Decimal::ONE,
    }
}

/// Convertit un montant pour l'affichage, arrondi à 2 décimales
/// Le prix stocké de l'annonce n'est jamais modifié
pub fn convert(amount: Decimal, from: Currency, to: Currency) -> Decimal {
    if from == to {
        return amount;
    }

    (amount * rate(from, to)).round_dp(2)
}

/// Convertisseur mémoïsé par (montant, paire de devises)
/// Injecté via web::Data, partagé entre tous les workers
pub struct CurrencyConverter {
    cache: Mutex<HashMap<(Decimal, Currency, Currency), Decimal>>,
}

impl CurrencyConverter {
    pub fn new() -> Self {
        CurrencyConverter {
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn display_price(&self, amount: Decimal, from: Currency, to: Currency) -> Decimal {
        if from == to {
            return amount;
        }

        let key = (amount, from, to);

        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return *cached;
        }

        let converted = convert(amount, from, to);
        self.cache.lock().unwrap().insert(key, converted);

        converted
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_conversion() {
        let amount = Decimal::new(15000, 2); // 150.00
        assert_eq!(convert(amount, Currency::Ron, Currency::Ron), amount);
    }

    #[test]
    fn test_eur_to_ron() {
        // 100 EUR * 4.970 = 497.00 RON
        let result = convert(Decimal::from(100), Currency::Eur, Currency::Ron);
        assert_eq!(result, Decimal::new(49700, 2));
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        // 33 RON * 0.201 = 6.633 -> 6.63
        let result = convert(Decimal::from(33), Currency::Ron, Currency::Eur);
        assert_eq!(result, Decimal::new(663, 2));
    }

    #[test]
    fn test_memoized_converter_is_consistent() {
        let converter = CurrencyConverter::new();
        let amount = Decimal::from(250);

        let first = converter.display_price(amount, Currency::Usd, Currency::Ron);
        let second = converter.display_price(amount, Currency::Usd, Currency::Ron);

        assert_eq!(first, second);
        assert_eq!(first, convert(amount, Currency::Usd, Currency::Ron));
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Currency::from_code("eur"), Some(Currency::Eur));
        assert_eq!(Currency::from_code("RON"), Some(Currency::Ron));
        assert_eq!(Currency::from_code("BTC"), None);
    }
}
