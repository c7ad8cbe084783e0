//! Share cards: a fixed-size PNG summarising a user's best-rated items,
//! reachable through an opaque share id.
//!
//! Rendering runs in two phases. [`ShareLayout::measure`] turns a
//! [`ShareCard`] into explicit pixel coordinates using glyph metrics, then
//! [`canvas::paint`] rasterises those commands. Nothing in the second phase
//! looks at text widths again.

pub mod canvas;
pub mod card;
pub mod glyphs;
pub mod layout;
pub mod service;
pub mod share_id;

pub use canvas::{encode_png, paint, render_png};
pub use card::{ShareCard, TOP_ITEMS_LIMIT, truncate_title};
pub use glyphs::{FontdueRasterizer, GlyphBitmap, GlyphRasterizer};
#[cfg(any(test, feature = "test-support"))]
pub use glyphs::FixedAdvanceGlyphs;
pub use layout::{Column, DrawCommand, ShareLayout, TextRun};
pub use service::{ShareService, share_image_key};
pub use share_id::ShareId;
