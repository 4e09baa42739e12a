//! Campaign performance reports: definition, download and row parsing.

pub mod report;
pub mod report_rows;
pub mod routes;
