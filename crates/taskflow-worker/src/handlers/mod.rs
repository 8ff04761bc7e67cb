//! Demonstration handlers only — wired up by the worker binary so it is
//! runnable end-to-end. Grounded in `original_source/handlers/email.py`
//! and `handlers/image.py`; real handler bodies are out of this crate's
//! scope.

mod process_image;
mod send_email;

pub use process_image::ProcessImage;
pub use send_email::SendEmail;
