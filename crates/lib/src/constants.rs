//! Constants used throughout the Feedback library.
//!
//! Column limits mirror the widths declared in the SQL schema so that every backend
//! rejects the same input.

/// Maximum length of a feedback title, in characters.
pub const TITLE_MAX_LEN: usize = 100;

/// Maximum length of an email address, in characters.
pub const EMAIL_MAX_LEN: usize = 50;

/// Maximum length of a first or last name, in characters.
pub const NAME_MAX_LEN: usize = 30;
