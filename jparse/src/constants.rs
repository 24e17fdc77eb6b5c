//! Fixed limits of the front end.

/// Number of bytes read from a source per scanning chunk.
///
/// The scanner keeps its state between chunks, so this only
/// affects how often the reader is polled.
pub const BUF_SIZE: usize = 4096;

/// Default bound of the operand and operator stacks used
/// during translation.
pub const STACK_SIZE: usize = 512;

/// Number of machine registers available to the translator.
pub const REGISTER_COUNT: usize = 4;

/// First tag of the token kind space. Tags below are invalid.
pub const TAG_MIN: u16 = 0x101;

/// Last tag of the token kind space. Tags above are invalid.
pub const TAG_MAX: u16 = 0x123;
