use std::fmt::{Display, Formatter, Result as FmtResult};

/// Type information for a DB2 column, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Db2TypeInfo {
    pub(crate) name: String,
}

impl Db2TypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Db2TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.name)
    }
}
