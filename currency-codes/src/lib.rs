//! ISO 4217 Currency Codes with Macro-Based Generation
//!
//! The reference set of currency codes is defined declaratively with a macro
//! that generates the `CurrencyCode` enum, its string conversions and the
//! minor-unit table.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     SLE => ("SLE", "Sierra Leonean leone", Some(2)),
//! }
//! ```
//!
//! # Example
//! ```
//! use currency_codes::{CurrencyCode, is_valid_currency};
//!
//! assert!(is_valid_currency("usd", None::<&[&str]>));
//! assert!(!is_valid_currency("USD", Some(&["EUR", "GBP"][..])));
//! assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
//! ```

use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines all currencies and the CurrencyCode enum
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define the currency reference set.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     NAME => ("CODE", "English name", minor_units),
/// }
/// ```
/// `minor_units` is `Some(n)` for circulating currencies and `None` for
/// funds, metals and the special `X..` codes.
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $label:literal, $minor:expr)
        ),* $(,)?
    ) => {
        /// Currency codes in the built-in ISO 4217 reference set.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $label),*
                }
            }

            /// Number of digits after the decimal separator, if the code has one.
            pub fn minor_units(&self) -> Option<u8> {
                match self {
                    $(CurrencyCode::$name => $minor),*
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(format!("Unknown currency: {}", s)),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    // Majors
    USD => ("USD", "US dollar", Some(2)),
    EUR => ("EUR", "Euro", Some(2)),
    GBP => ("GBP", "Pound sterling", Some(2)),
    JPY => ("JPY", "Japanese yen", Some(0)),
    CHF => ("CHF", "Swiss franc", Some(2)),
    CAD => ("CAD", "Canadian dollar", Some(2)),
    AUD => ("AUD", "Australian dollar", Some(2)),
    NZD => ("NZD", "New Zealand dollar", Some(2)),
    CNY => ("CNY", "Renminbi", Some(2)),
    HKD => ("HKD", "Hong Kong dollar", Some(2)),
    SGD => ("SGD", "Singapore dollar", Some(2)),

    // Europe
    SEK => ("SEK", "Swedish krona", Some(2)),
    NOK => ("NOK", "Norwegian krone", Some(2)),
    DKK => ("DKK", "Danish krone", Some(2)),
    ISK => ("ISK", "Icelandic krona", Some(0)),
    PLN => ("PLN", "Polish zloty", Some(2)),
    CZK => ("CZK", "Czech koruna", Some(2)),
    HUF => ("HUF", "Hungarian forint", Some(2)),
    RON => ("RON", "Romanian leu", Some(2)),
    BGN => ("BGN", "Bulgarian lev", Some(2)),
    RSD => ("RSD", "Serbian dinar", Some(2)),
    MKD => ("MKD", "Macedonian denar", Some(2)),
    BAM => ("BAM", "Bosnia and Herzegovina convertible mark", Some(2)),
    ALL => ("ALL", "Albanian lek", Some(2)),
    MDL => ("MDL", "Moldovan leu", Some(2)),
    UAH => ("UAH", "Ukrainian hryvnia", Some(2)),
    BYN => ("BYN", "Belarusian ruble", Some(2)),
    RUB => ("RUB", "Russian ruble", Some(2)),
    TRY => ("TRY", "Turkish lira", Some(2)),
    GEL => ("GEL", "Georgian lari", Some(2)),
    AMD => ("AMD", "Armenian dram", Some(2)),
    AZN => ("AZN", "Azerbaijani manat", Some(2)),

    // Asia & Pacific
    INR => ("INR", "Indian rupee", Some(2)),
    PKR => ("PKR", "Pakistani rupee", Some(2)),
    BDT => ("BDT", "Bangladeshi taka", Some(2)),
    LKR => ("LKR", "Sri Lankan rupee", Some(2)),
    NPR => ("NPR", "Nepalese rupee", Some(2)),
    IDR => ("IDR", "Indonesian rupiah", Some(2)),
    MYR => ("MYR", "Malaysian ringgit", Some(2)),
    THB => ("THB", "Thai baht", Some(2)),
    VND => ("VND", "Vietnamese dong", Some(0)),
    PHP => ("PHP", "Philippine peso", Some(2)),
    KRW => ("KRW", "South Korean won", Some(0)),
    TWD => ("TWD", "New Taiwan dollar", Some(2)),
    KZT => ("KZT", "Kazakhstani tenge", Some(2)),

    // Middle East & Africa
    ILS => ("ILS", "Israeli new shekel", Some(2)),
    AED => ("AED", "UAE dirham", Some(2)),
    SAR => ("SAR", "Saudi riyal", Some(2)),
    QAR => ("QAR", "Qatari riyal", Some(2)),
    KWD => ("KWD", "Kuwaiti dinar", Some(3)),
    BHD => ("BHD", "Bahraini dinar", Some(3)),
    OMR => ("OMR", "Omani rial", Some(3)),
    JOD => ("JOD", "Jordanian dinar", Some(3)),
    EGP => ("EGP", "Egyptian pound", Some(2)),
    MAD => ("MAD", "Moroccan dirham", Some(2)),
    TND => ("TND", "Tunisian dinar", Some(3)),
    DZD => ("DZD", "Algerian dinar", Some(2)),
    NGN => ("NGN", "Nigerian naira", Some(2)),
    GHS => ("GHS", "Ghanaian cedi", Some(2)),
    KES => ("KES", "Kenyan shilling", Some(2)),
    UGX => ("UGX", "Ugandan shilling", Some(0)),
    TZS => ("TZS", "Tanzanian shilling", Some(2)),
    ETB => ("ETB", "Ethiopian birr", Some(2)),
    ZAR => ("ZAR", "South African rand", Some(2)),
    XOF => ("XOF", "West African CFA franc", Some(0)),
    XAF => ("XAF", "Central African CFA franc", Some(0)),

    // Americas
    MXN => ("MXN", "Mexican peso", Some(2)),
    BRL => ("BRL", "Brazilian real", Some(2)),
    ARS => ("ARS", "Argentine peso", Some(2)),
    CLP => ("CLP", "Chilean peso", Some(0)),
    COP => ("COP", "Colombian peso", Some(2)),
    PEN => ("PEN", "Peruvian sol", Some(2)),
    UYU => ("UYU", "Uruguayan peso", Some(2)),
    BOB => ("BOB", "Boliviano", Some(2)),
    PYG => ("PYG", "Paraguayan guarani", Some(0)),
    VES => ("VES", "Venezuelan bolivar soberano", Some(2)),
    CRC => ("CRC", "Costa Rican colon", Some(2)),
    DOP => ("DOP", "Dominican peso", Some(2)),
    GTQ => ("GTQ", "Guatemalan quetzal", Some(2)),
    JMD => ("JMD", "Jamaican dollar", Some(2)),
    TTD => ("TTD", "Trinidad and Tobago dollar", Some(2)),

    // Special codes
    XAU => ("XAU", "Gold (one troy ounce)", None),
    XAG => ("XAG", "Silver (one troy ounce)", None),
    XDR => ("XDR", "Special drawing rights", None),
    XTS => ("XTS", "Code reserved for testing", None),
    XXX => ("XXX", "No currency", None),
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Checks a currency code, ignoring case.
///
/// With an allow-list the code must appear in it; an empty allow-list
/// rejects everything. Without one the built-in reference set is used.
pub fn is_valid_currency<S: AsRef<str>>(code: &str, allow_list: Option<&[S]>) -> bool {
    match allow_list {
        Some(allowed) => allowed
            .iter()
            .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(code)),
        None => code.parse::<CurrencyCode>().is_ok(),
    }
}

/// Same as [`is_valid_currency`] over an arbitrary JSON value.
///
/// Anything other than a string (including an absent value) is invalid.
pub fn is_valid_currency_value<S: AsRef<str>>(
    value: Option<&Value>,
    allow_list: Option<&[S]>,
) -> bool {
    match value {
        Some(Value::String(code)) => is_valid_currency(code, allow_list),
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NO_LIST: Option<&[&str]> = None;

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("".parse::<CurrencyCode>().is_err());
        assert!("DOLLARS".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_code_display() {
        assert_eq!(CurrencyCode::USD.to_string(), "USD");
        assert_eq!(CurrencyCode::XXX.name(), "No currency");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(CurrencyCode::JPY.minor_units(), Some(0));
        assert_eq!(CurrencyCode::KWD.minor_units(), Some(3));
        assert_eq!(CurrencyCode::XAU.minor_units(), None);
    }

    #[test]
    fn test_reference_set_is_complete_and_unique() {
        let all = CurrencyCode::all();
        assert!(all.len() >= 80);

        let mut codes: Vec<&str> = all.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
        assert!(codes.iter().all(|c| c.len() == 3));
    }

    #[test]
    fn test_validation_is_case_insensitive() {
        assert!(is_valid_currency("USD", NO_LIST));
        assert!(is_valid_currency("usd", NO_LIST));
        assert!(is_valid_currency("uSd", NO_LIST));
        assert!(is_valid_currency("xxx", NO_LIST));
        assert!(!is_valid_currency("ABC", NO_LIST));
        assert!(!is_valid_currency("", NO_LIST));
    }

    #[test]
    fn test_allow_list_overrides_reference_set() {
        let allowed = ["usd", "EUR"];
        assert!(is_valid_currency("USD", Some(&allowed[..])));
        assert!(is_valid_currency("eur", Some(&allowed[..])));
        assert!(!is_valid_currency("GBP", Some(&allowed[..])));

        // Codes outside ISO 4217 are accepted when explicitly allowed
        assert!(is_valid_currency("BTC", Some(&["BTC"][..])));
    }

    #[test]
    fn test_empty_allow_list_rejects_everything() {
        let empty: [&str; 0] = [];
        assert!(!is_valid_currency("USD", Some(&empty[..])));
        assert!(!is_valid_currency("EUR", Some(&empty[..])));
    }

    #[test]
    fn test_non_string_values_are_invalid() {
        let inputs = [
            json!(null),
            json!(840),
            json!(true),
            json!(["USD"]),
            json!({ "code": "USD" }),
        ];
        for input in &inputs {
            assert!(!is_valid_currency_value(Some(input), NO_LIST), "{input}");
        }
        assert!(!is_valid_currency_value(None, NO_LIST));
        assert!(is_valid_currency_value(Some(&json!("gbp")), NO_LIST));
    }
}
