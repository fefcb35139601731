//! Core trait abstractions for the heritage library.
//!
//! These traits define the collaborators an application provides:
//! the remote site source, the thumbnail resolver and the map widget.

pub mod images;
pub mod map;
pub mod source;
