//! License and IP-risk checks at file granularity.

mod checker;
mod classify;

#[cfg(test)]
mod tests;

pub use checker::{LicenseChecker, detect_licenses, license_violates};
pub use classify::{LicenseClass, classify, split_expression};
