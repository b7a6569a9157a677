//! Mail adapters. Implement MailPort.
//!
//! SES for production; a logging mailer for dry runs and tests.

pub mod log_mailer;
pub mod ses_mailer;

pub use log_mailer::LogMailer;
pub use ses_mailer::SesMailer;
