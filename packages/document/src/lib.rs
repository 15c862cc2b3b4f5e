//! # Mailblocks Document
//!
//! Normalized block-tree model for email templates.
//!
//! A document is a flat mapping from block id to [`Block`]. Tree shape is
//! expressed through child-id lists on the three container kinds:
//!
//! ```text
//! EmailLayout       data.childrenIds            (ordered, single list)
//! Container         data.props.childrenIds      (ordered, single list)
//! ColumnsContainer  data.props.columns[i]
//!                       .childrenIds            (1..=4 ordered lists)
//! ```
//!
//! Every other kind is a leaf. The [`ContainerAdapter`] trait hides the
//! three physical shapes behind one ordered-children view so that editing
//! code is written once, not three times.
//!
//! The mapping itself is the canonical serialized form: round-tripping
//! through JSON is lossless for the linkage fields above, and all other
//! `style`/`props` content passes through untouched.

mod adapters;
mod block;
mod document;
mod error;
mod id_generator;

pub use adapters::{adapter_for, ColumnsAdapter, ContainerAdapter, LayoutAdapter, StackAdapter};
pub use block::{Block, BlockData, BlockKind, BlockProps, Column};
pub use document::{ChildView, Document, ParentRef, ROOT_ID};
pub use error::DocumentError;
pub use id_generator::IdGenerator;
