//! PDF generation — text cleanup, page planning, and the printpdf renderer.

pub mod layout;
pub mod render;
pub mod text;

pub use render::{render_client_pdf, render_practitioner_pdf};
