//! Reply decoding and artifact export for the docchat client.
//!
//! An assistant reply is a single UTF-8 string that may embed one structured
//! payload (slide deck and/or spreadsheet description) behind the `&&json`
//! sentinel.  This crate turns such a string into a [`DecodedReply`] — prose
//! with the payload excised, plus typed artifacts — and synthesizes the
//! downloadable files (`.pptx`, `.xlsx`, print HTML) from those artifacts.
//!
//! Decoding is a pure function of the message content: no network, no
//! mutation of the caller's message, same output for the same input.

pub mod artifact;
pub mod decode;
pub mod export;
pub mod message;
pub mod render;

mod scanner;

pub use artifact::{Cell, ChartSeries, ItemOptions, SlideItem, SlideSpec, SpreadsheetSpec};
pub use decode::{decode, decode_message, DecodeError, DecodedReply, SENTINEL};
pub use message::{ChatMessage, ContentType, Role};
