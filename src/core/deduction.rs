use super::allowance::DONATION_CAP;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Administratively configurable deduction caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeductionKind {
    Personal,
    KReceipt,
}

impl DeductionKind {
    pub const ALL: [DeductionKind; 2] = [DeductionKind::Personal, DeductionKind::KReceipt];

    /// Inclusive range an administrator may set this cap to
    pub fn limits(&self) -> (Decimal, Decimal) {
        match self {
            DeductionKind::Personal => (dec!(10000), dec!(100000)),
            DeductionKind::KReceipt => (Decimal::ZERO, dec!(100000)),
        }
    }

    /// Value seeded into a fresh store
    pub fn default_value(&self) -> Decimal {
        match self {
            DeductionKind::Personal => dec!(60000),
            DeductionKind::KReceipt => dec!(50000),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeductionKind::Personal => "personal",
            DeductionKind::KReceipt => "k-receipt",
        }
    }
}

impl std::fmt::Display for DeductionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeductionError {
    #[error("{0} deduction not found")]
    NotFound(DeductionKind),
    #[error("deduction storage error: {0}")]
    Storage(String),
    #[error("{kind} deduction {value} outside allowed range {min}-{max}")]
    OutOfRange {
        kind: DeductionKind,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },
}

/// Source of the administratively configured deduction caps.
///
/// Reads take `&self` so any number of calculations can share one provider;
/// implementations must make each read of a single key consistent.
pub trait DeductionProvider {
    fn cap(&self, kind: DeductionKind) -> Result<Decimal, DeductionError>;

    fn set_cap(&mut self, kind: DeductionKind, value: Decimal) -> Result<(), DeductionError>;
}

/// In-memory provider with fixed values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDeductions {
    caps: HashMap<DeductionKind, Decimal>,
}

impl StaticDeductions {
    pub fn new(personal: Decimal, k_receipt: Decimal) -> Self {
        let mut caps = HashMap::new();
        caps.insert(DeductionKind::Personal, personal);
        caps.insert(DeductionKind::KReceipt, k_receipt);
        StaticDeductions { caps }
    }

    /// Provider holding the values a fresh store is seeded with
    pub fn defaults() -> Self {
        Self::new(
            DeductionKind::Personal.default_value(),
            DeductionKind::KReceipt.default_value(),
        )
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl DeductionProvider for StaticDeductions {
    fn cap(&self, kind: DeductionKind) -> Result<Decimal, DeductionError> {
        self.caps
            .get(&kind)
            .copied()
            .ok_or(DeductionError::NotFound(kind))
    }

    fn set_cap(&mut self, kind: DeductionKind, value: Decimal) -> Result<(), DeductionError> {
        self.caps.insert(kind, value);
        Ok(())
    }
}

/// Caps in force for a single calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductionCaps {
    pub personal: Decimal,
    pub donation: Decimal,
    pub k_receipt: Decimal,
}

impl DeductionCaps {
    /// Read the configurable caps from the provider, failing on the first
    /// cap that cannot be supplied.
    pub fn load<P: DeductionProvider + ?Sized>(provider: &P) -> Result<Self, DeductionError> {
        let personal = provider.cap(DeductionKind::Personal)?;
        let k_receipt = provider.cap(DeductionKind::KReceipt)?;
        Ok(DeductionCaps {
            personal,
            donation: DONATION_CAP,
            k_receipt,
        })
    }
}

/// Personal deduction plus the already clamped allowance total
pub fn total_deduction(personal: Decimal, total_allowance: Decimal) -> Decimal {
    personal + total_allowance
}

/// Administrative update of a cap. The value is checked against the kind's
/// limits before anything is written.
pub fn set_deduction<P: DeductionProvider + ?Sized>(
    provider: &mut P,
    kind: DeductionKind,
    value: Decimal,
) -> Result<Decimal, DeductionError> {
    let (min, max) = kind.limits();
    if value < min || value > max {
        return Err(DeductionError::OutOfRange {
            kind,
            value,
            min,
            max,
        });
    }

    provider.set_cap(kind, value)?;
    log::info!("Updated {} deduction to {}", kind, value);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduction_is_personal_plus_allowances() {
        assert_eq!(total_deduction(dec!(60000), dec!(20)), dec!(60020));
        assert_eq!(total_deduction(dec!(70000), dec!(30000)), dec!(100000));
    }

    #[test]
    fn caps_loaded_from_provider() {
        let caps = DeductionCaps::load(&StaticDeductions::new(dec!(70000), dec!(40000))).unwrap();
        assert_eq!(caps.personal, dec!(70000));
        assert_eq!(caps.k_receipt, dec!(40000));
        assert_eq!(caps.donation, dec!(100000));
    }

    #[test]
    fn missing_cap_is_not_found() {
        let mut provider = StaticDeductions::empty();
        provider.set_cap(DeductionKind::Personal, dec!(60000)).unwrap();

        assert_eq!(
            DeductionCaps::load(&provider),
            Err(DeductionError::NotFound(DeductionKind::KReceipt))
        );
    }

    #[test]
    fn set_personal_within_limits() {
        let mut provider = StaticDeductions::defaults();
        assert_eq!(
            set_deduction(&mut provider, DeductionKind::Personal, dec!(70000)),
            Ok(dec!(70000))
        );
        assert_eq!(provider.cap(DeductionKind::Personal), Ok(dec!(70000)));
    }

    #[test]
    fn limits_are_inclusive() {
        let mut provider = StaticDeductions::defaults();
        assert!(set_deduction(&mut provider, DeductionKind::Personal, dec!(10000)).is_ok());
        assert!(set_deduction(&mut provider, DeductionKind::Personal, dec!(100000)).is_ok());
        assert!(set_deduction(&mut provider, DeductionKind::KReceipt, Decimal::ZERO).is_ok());
        assert!(set_deduction(&mut provider, DeductionKind::KReceipt, dec!(100000)).is_ok());
    }

    #[test]
    fn out_of_range_is_rejected_without_writing() {
        let mut provider = StaticDeductions::defaults();

        let err = set_deduction(&mut provider, DeductionKind::Personal, dec!(9999.99)).unwrap_err();
        assert_eq!(
            err,
            DeductionError::OutOfRange {
                kind: DeductionKind::Personal,
                value: dec!(9999.99),
                min: dec!(10000),
                max: dec!(100000),
            }
        );
        assert!(set_deduction(&mut provider, DeductionKind::KReceipt, dec!(100001)).is_err());
        assert!(set_deduction(&mut provider, DeductionKind::KReceipt, dec!(-1)).is_err());

        assert_eq!(provider, StaticDeductions::defaults());
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(serde_json::to_string(&DeductionKind::KReceipt).unwrap(), "\"k-receipt\"");
        assert_eq!(DeductionKind::Personal.to_string(), "personal");
    }
}
