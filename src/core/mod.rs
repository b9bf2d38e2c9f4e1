pub mod allowance;
pub mod bracket;
pub mod calculator;
pub mod deduction;
pub mod income;
pub mod request;

// Flat public surface for domain types and functions.
pub use allowance::{AllowanceItem, DONATION_CAP};
pub use bracket::TaxResult;
pub use calculator::{calculate_batch, calculate_tax, BatchEntry};
pub use deduction::{
    set_deduction, DeductionError, DeductionKind, DeductionProvider, StaticDeductions,
};
pub use request::{InputError, TaxRequest};
