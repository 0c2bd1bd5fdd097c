//! Fixed-precision formatting of Lennard-Jones parameters.
//!
//! Downstream engines read these values as fixed-width decimal text, so the number of
//! decimal places is part of the file contract.

pub const ATOM_EPSILON_DECIMALS: usize = 5;
pub const ATOM_SIGMA_DECIMALS: usize = 4;
pub const PAIR_DECIMALS: usize = 8;

pub fn fixed(value: f64, decimals: usize) -> String {
    // Avoid writing "-0.00000" for values that round to zero.
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.*}", decimals, value)
}

pub fn atom_epsilon(value: f64) -> String {
    fixed(value, ATOM_EPSILON_DECIMALS)
}

pub fn atom_sigma(value: f64) -> String {
    fixed(value, ATOM_SIGMA_DECIMALS)
}

pub fn pair_value(value: f64) -> String {
    fixed(value, PAIR_DECIMALS)
}
