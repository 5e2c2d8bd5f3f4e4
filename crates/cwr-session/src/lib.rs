//! Named-session storage: one directory per session holding the persisted
//! message log (`history.json`) and uploaded files.

pub mod store;
pub mod uploads;

pub use store::{
    HISTORY_FILE_NAME, SessionSummary, clear_history, delete_session, list_sessions,
    load_or_init, load_transcript, save_transcript, session_dir, validate_session_name,
};
pub use uploads::{file_to_data_url, is_image_file, store_upload};
