//! CSV import and export of student data.

mod export;
mod import;

pub use export::{program_report_csv, students_csv, DataExportError, StudentExportFilter};
pub use import::{
    parse_student_csv, DataImportError, ImportRowError, ImportSummary, StudentCsvRecord,
    StudentImportRow,
};
