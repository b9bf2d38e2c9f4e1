use rust_decimal::Decimal;

/// Taxable base: gross income less total deduction, never below zero
pub fn net_income(gross_income: Decimal, total_deduction: Decimal) -> Decimal {
    (gross_income - total_deduction).max(Decimal::ZERO)
}
