use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A checksum-validated ISBN with its canonical 13-digit form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Isbn {
    pub isbn13: String,
}

/// Drops hyphens, spaces and any other separators; upper-cases the `X` check digit.
pub fn strip_isbn(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

fn check_isbn10(digits: &[u32]) -> bool {
    // digits[9] may be 10 (X)
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| (10 - i as u32) * d)
        .sum();
    sum % 11 == 0
}

fn isbn13_checksum(digits: &[u32]) -> u32 {
    digits
        .iter()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d } else { d * 3 })
        .sum()
}

fn isbn10_to_isbn13(digits10: &[u32]) -> String {
    let mut d13: Vec<u32> = vec![9, 7, 8];
    d13.extend_from_slice(&digits10[..9]);
    let check = (10 - isbn13_checksum(&d13) % 10) % 10;
    d13.push(check);
    d13.iter().map(|d| d.to_string()).collect()
}

impl Isbn {
    pub fn parse(input: &str) -> Result<Self> {
        let stripped = strip_isbn(input);
        let invalid = || CoreError::InvalidIsbn(input.to_string());

        match stripped.len() {
            13 => {
                let digits = stripped
                    .chars()
                    .map(|c| c.to_digit(10))
                    .collect::<Option<Vec<u32>>>()
                    .ok_or_else(invalid)?;
                if isbn13_checksum(&digits) % 10 != 0 {
                    return Err(invalid());
                }
                Ok(Self { isbn13: stripped })
            }
            10 => {
                let mut digits: Vec<u32> = Vec::with_capacity(10);
                for (i, c) in stripped.chars().enumerate() {
                    match c.to_digit(10) {
                        Some(d) => digits.push(d),
                        None if i == 9 && c == 'X' => digits.push(10),
                        None => return Err(invalid()),
                    }
                }
                if !check_isbn10(&digits) {
                    return Err(invalid());
                }
                Ok(Self {
                    isbn13: isbn10_to_isbn13(&digits),
                })
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_isbn13() {
        let isbn = Isbn::parse("9780306406157").unwrap();
        assert_eq!(isbn.isbn13, "9780306406157");
    }

    #[test]
    fn isbn13_with_hyphens() {
        let isbn = Isbn::parse("978-0-306-40615-7").unwrap();
        assert_eq!(isbn.isbn13, "9780306406157");
    }

    #[test]
    fn valid_isbn10_converts_to_isbn13() {
        let isbn = Isbn::parse("0306406152").unwrap();
        assert_eq!(isbn.isbn13, "9780306406157");
    }

    #[test]
    fn isbn10_with_x_check() {
        let isbn = Isbn::parse("007462542x").unwrap();
        assert_eq!(isbn.isbn13, "9780074625422");
    }

    #[test]
    fn invalid_check_digit() {
        assert!(Isbn::parse("9780306406158").is_err());
    }

    #[test]
    fn letters_are_rejected_without_panicking() {
        assert!(Isbn::parse("97803064061AB").is_err());
        assert!(Isbn::parse("UOM:39015").is_err());
    }

    #[test]
    fn isbn13_979_is_accepted() {
        let isbn = Isbn::parse("979-10-323-0569-0").unwrap();
        assert_eq!(isbn.isbn13, "9791032305690");
    }
}
