pub mod labels;
pub mod mailer;
pub mod notification;
