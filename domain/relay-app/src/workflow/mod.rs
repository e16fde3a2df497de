pub mod relay_report;
