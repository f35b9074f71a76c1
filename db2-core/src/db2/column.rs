use crate::db2::Db2TypeInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Db2Column {
    pub(crate) name: String,
    pub(crate) type_info: Db2TypeInfo,
    pub(crate) ordinal: usize,
}

impl Db2Column {
    pub fn new(name: impl Into<String>, type_info: Db2TypeInfo, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            type_info,
            ordinal,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_info(&self) -> &Db2TypeInfo {
        &self.type_info
    }
}
