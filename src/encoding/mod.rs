//! The encode collaborator: content → [`Symbol`].
//!
//! The module is split into:
//! - **Backend**: [`SymbolEncoder`] trait, [`Symbol`], [`EncodeError`]
//! - **QR backend**: [`QrEncoder`], the `qrcode`-crate implementation
//! - **Charset**: how text becomes bytes, and whether it can
//! - **Capacity**: codeword tables for symbol metadata

pub mod backend;
pub mod capacity;
pub mod charset;
pub mod qr_backend;

pub use backend::{EncodeError, EncodeHints, EncodingMode, Symbol, SymbolEncoder};
pub use charset::Charset;
pub use qr_backend::QrEncoder;
