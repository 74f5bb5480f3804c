pub mod options_reader;
pub mod report_writer;
