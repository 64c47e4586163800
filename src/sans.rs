//! Frame synchronization engine and its finite-state machine.
//!
//! This module holds the pieces the [`StreamDecoder`] drives on every call to
//! `feed`. They are public for applications that need to run the engine over
//! their own buffers (for example, a fixed-capacity buffer on an embedded
//! target).
//!
//! # Architecture
//!
//! A [`FrameFormat`] describes one sensor protocol: a fixed frame length, an
//! alignment pattern at the start of each frame, a checksum and the layout of
//! the frame's fields. The decoder moves between two states, each represented
//! by a zero-size, non-copy token:
//!
//! - [`Seeking`]: looking for the earliest alignment with a whole frame behind
//! it. Advancing returns either a count of bytes that can never begin a frame,
//! or a [`HaveFrame`] token.
//!
//! - [`HaveFrame`]: a candidate frame is buffered. Advancing validates it,
//! decodes it if valid, and returns the number of bytes to discard along with
//! a fresh [`Seeking`] token.
//!
//! A rejected candidate discards only its first byte, so a false alignment
//! inside a corrupted frame never hides a real frame starting one byte later.
//! Some areas of the decoding process are not represented in the state
//! machine and must be carefully written by custom drivers:
//!
//! - Discarding exactly the number of bytes each transition reports.
//!
//! - Bounding memory. [`buffer::Accumulator`] enforces a maximum length.
//!
//! Implementers are recommended to begin by studying [`StreamDecoder`].
//!
//! [`FrameFormat`]: format::FrameFormat
//! [`StreamDecoder`]: stream::StreamDecoder
//! [`Seeking`]: stream::Seeking
//! [`HaveFrame`]: stream::HaveFrame

pub mod buffer;
pub mod check;
pub mod decode;
pub mod format;
pub mod record;
pub mod stream;
pub mod sync;
pub mod validate;

/// Entrypoint to the finite-state machine.
pub type Decoder<'a> = stream::StreamDecoder<'a>;
