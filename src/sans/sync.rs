//! Locating frame boundaries.

/// Outcome of scanning buffered bytes for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// A whole candidate frame starts at this offset.
    Candidate(usize),
    /// No whole candidate frame is buffered. The leading `discardable` bytes
    /// can never begin a frame.
    Insufficient { discardable: usize },
}

/// Find the earliest offset at which `alignment` begins and a frame of
/// `frame_size` bytes is fully buffered.
///
/// When nothing matches, every byte except the last `alignment.len() - 1` is
/// discardable, since only those may begin a match once more bytes arrive.
/// When the pattern matches but the frame is incomplete, the bytes before the
/// match are discardable. No later match can complete sooner.
pub fn find_alignment(buffered: &[u8], alignment: &[u8], frame_size: usize) -> Alignment {
    let Some(offset) = buffered
        .windows(alignment.len())
        .position(|w| w == alignment)
    else {
        let keep = alignment.len().saturating_sub(1);
        return Alignment::Insufficient {
            discardable: buffered.len().saturating_sub(keep),
        };
    };

    if offset + frame_size <= buffered.len() {
        Alignment::Candidate(offset)
    } else {
        Alignment::Insufficient {
            discardable: offset,
        }
    }
}
