pub mod csv_upload_source;
pub mod identity_filter;
pub mod import_log_side_effect;
