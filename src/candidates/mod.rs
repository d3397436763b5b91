//! Password candidate generation.
//!
//! [`CandidateSource`] merges an uploaded [`Wordlist`] with exhaustive
//! [`SequentialGenerator`] enumeration, filtering both through an
//! [`ExclusionSet`].

mod alphabet;
mod exclusion;
mod sequential;
mod source;
mod wordlist;

pub use alphabet::{Alphabet, NUMBERS_CHAR_SET, SYMBOLS_CHAR_SET, UPPERCASE_CHAR_SET};
pub use exclusion::ExclusionSet;
pub use sequential::SequentialGenerator;
pub use source::{Candidate, CandidateSource, Phase, SourceProgress};
pub use wordlist::Wordlist;
