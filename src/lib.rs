pub mod error;
pub mod format;
pub mod kind;
pub mod packed;

pub mod octahedral;

pub mod layout;
pub mod stream;

pub mod skin;

pub use error::CodecError;
pub use format::{Channels, FormatDescriptor, Layout};
pub use kind::NumericKind;
pub use packed::PackedLayout;

/// Separates the encoding and type tokens of a format name.
pub const FORMAT_DELIMITER: char = '_';

pub type HashMap<K, V> = rapidhash::RapidHashMap<K, V>;
