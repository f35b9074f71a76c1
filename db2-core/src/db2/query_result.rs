use crate::db2::Db2Row;

/// The outcome of one executed statement: the rows it returned and the rows it changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Db2QueryResult {
    pub(crate) rows: Vec<Db2Row>,
    pub(crate) rows_affected: u64,
}

impl Db2QueryResult {
    pub fn new(rows: Vec<Db2Row>, rows_affected: u64) -> Self {
        Self {
            rows,
            rows_affected,
        }
    }

    pub fn rows(&self) -> &[Db2Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Db2Row> {
        self.rows
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

impl Extend<Db2QueryResult> for Db2QueryResult {
    fn extend<T: IntoIterator<Item = Db2QueryResult>>(&mut self, iter: T) {
        for elem in iter {
            self.rows.extend(elem.rows);
            self.rows_affected += elem.rows_affected;
        }
    }
}
