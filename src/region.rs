use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// A genomic interval on one chromosome, both ends inclusive.
///
/// A single position has `start == end`. `end == start - 1` is the only
/// accepted inverted form and denotes an empty region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
}

/// Anything a [`Region`] can be loaded from.
#[derive(Debug, Clone, Copy)]
pub enum RegionInput<'a> {
    Region(&'a Region),
    Text(&'a str),
}

impl<'a> From<&'a Region> for RegionInput<'a> {
    fn from(region: &'a Region) -> Self {
        RegionInput::Region(region)
    }
}

impl<'a> From<&'a str> for RegionInput<'a> {
    fn from(text: &'a str) -> Self {
        RegionInput::Text(text)
    }
}

impl Region {
    pub fn new(chromosome: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
        }
    }

    /// Parse `chrom:start-end` or `chrom:position` into `self`.
    ///
    /// Returns `false` and leaves `self` untouched when the text is malformed.
    pub fn parse(&mut self, text: &str) -> bool {
        match parse_region_text(text) {
            Some((chromosome, start, end)) => {
                self.chromosome = chromosome.to_string();
                self.start = start;
                self.end = end;
                true
            }
            None => false,
        }
    }

    /// Copy coordinates from another region, or re-parse from text.
    pub fn load<'a>(&mut self, input: impl Into<RegionInput<'a>>) -> bool {
        match input.into() {
            RegionInput::Region(other) => {
                self.chromosome.clone_from(&other.chromosome);
                self.start = other.start;
                self.end = other.end;
                true
            }
            RegionInput::Text(text) => self.parse(text),
        }
    }

    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn center(&self) -> i64 {
        self.start + self.length().div_euclid(2)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.chromosome == other.chromosome && self.start <= other.end && self.end >= other.start
    }

    /// Textual form, optionally with thousands separators for display.
    pub fn format(&self, formatted: bool) -> String {
        if formatted {
            format!(
                "{}:{}-{}",
                self.chromosome,
                group_thousands(self.start),
                group_thousands(self.end)
            )
        } else {
            format!("{}:{}-{}", self.chromosome, self.start, self.end)
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

impl FromStr for Region {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut region = Region::default();
        if region.parse(s) {
            Ok(region)
        } else {
            Err(CacheError::InvalidRegion(s.to_string()))
        }
    }
}

fn parse_region_text(text: &str) -> Option<(&str, i64, i64)> {
    let (chromosome, coords) = text.split_once(':')?;
    if chromosome.is_empty()
        || !chromosome
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
    {
        return None;
    }

    let (start, end) = match coords.split_once('-') {
        Some((start, end)) => (parse_coordinate(start)?, parse_coordinate(end)?),
        None => {
            let position = parse_coordinate(coords)?;
            (position, position)
        }
    };

    if end < start - 1 {
        return None;
    }
    Some((chromosome, start, end))
}

fn parse_coordinate(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        let mut region = Region::default();
        assert!(region.parse("chr1:150-250"));
        assert_eq!(region, Region::new("chr1", 150, 250));
        assert_eq!(region.length(), 101);
        assert_eq!(region.center(), 200);
    }

    #[test]
    fn test_parse_single_position() {
        let mut region = Region::default();
        assert!(region.parse("chr2:500"));
        assert_eq!(region, Region::new("chr2", 500, 500));
        assert_eq!(region.length(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed_without_mutating() {
        let mut region = Region::new("chr3", 10, 20);
        for bad in ["bad-input", "chr1:", ":100-200", "chr1:a-b", "chr-1:5", "chr1:5-", "chr1:500-10"] {
            assert!(!region.parse(bad), "accepted {bad:?}");
            assert_eq!(region, Region::new("chr3", 10, 20));
        }
    }

    #[test]
    fn test_parse_accepts_versioned_contig() {
        let region: Region = "GL000192.1:1-547496".parse().unwrap();
        assert_eq!(region, Region::new("GL000192.1", 1, 547_496));
        assert_eq!(region.to_string().parse::<Region>().unwrap(), region);
    }

    #[test]
    fn test_parse_accepts_empty_region() {
        let region: Region = "1:101-100".parse().unwrap();
        assert!(region.is_empty());
        assert_eq!(region.length(), 0);
    }

    #[test]
    fn test_load_from_region_and_text() {
        let mut region = Region::default();
        assert!(region.load(&Region::new("X", 1, 2)));
        assert_eq!(region, Region::new("X", 1, 2));

        assert!(region.load("Y:30-40"));
        assert_eq!(region, Region::new("Y", 30, 40));

        assert!(!region.load("nonsense"));
        assert_eq!(region, Region::new("Y", 30, 40));
    }

    #[test]
    fn test_format() {
        let region = Region::new("13", 32_889_611, 32_973_805);
        assert_eq!(region.to_string(), "13:32889611-32973805");
        assert_eq!(region.format(false), "13:32889611-32973805");
        assert_eq!(region.format(true), "13:32,889,611-32,973,805");
        assert_eq!(Region::new("1", 999, 1000).format(true), "1:999-1,000");
    }

    #[test]
    fn test_center_rounds_down() {
        assert_eq!(Region::new("1", 1, 4).center(), 3);
        assert_eq!(Region::new("1", 1, 5).center(), 3);
        assert_eq!(Region::new("1", 7, 7).center(), 7);
    }
}
