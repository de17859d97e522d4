use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudybaseError {
    #[error("Unknown entry type: {0}")]
    UnknownEntryType(String),
}
