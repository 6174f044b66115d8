use std::fmt;

use serde::Serialize;

/// Gender segment a shoe size is sold under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GenderBucket {
    Feminine,
    Masculine,
    Other,
}

impl GenderBucket {
    /// Buckets a size by fixed inclusive ranges.
    ///
    /// | Range      | Bucket    |
    /// |------------|-----------|
    /// | 34 ..= 39  | Feminine  |
    /// | 40 ..= 44  | Masculine |
    /// | otherwise  | Other     |
    pub fn from_size(size: f64) -> Self {
        match size {
            s if (34.0..=39.0).contains(&s) => GenderBucket::Feminine,
            s if (40.0..=44.0).contains(&s) => GenderBucket::Masculine,
            _ => GenderBucket::Other,
        }
    }

    /// Label written to the reports.
    pub fn label(self) -> &'static str {
        match self {
            GenderBucket::Feminine => "Feminino",
            GenderBucket::Masculine => "Masculino",
            GenderBucket::Other => "Outros",
        }
    }
}

impl fmt::Display for GenderBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
