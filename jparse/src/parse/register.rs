use std::fmt;

use crate::constants::REGISTER_COUNT;

/// Machine register of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Accumulator. Implicit left operand and destination
    /// of `mul` and `div`.
    Eax = 0,
    Ebx = 1,
    Ecx = 2,
    Edx = 3,
}

impl Register {
    pub const ALL: [Register; REGISTER_COUNT] =
        [Register::Eax, Register::Ebx, Register::Ecx, Register::Edx];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Register::Eax => "eax",
            Register::Ebx => "ebx",
            Register::Ecx => "ecx",
            Register::Edx => "edx",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simple bitmask to track which registers hold a live value.
///
/// Allocating and freeing specific registers replaces the push-pop
/// semantics of a stack machine. The accumulator is only handed out
/// on request, general allocation starts at the second register.
pub struct RegisterTable(u8);

impl RegisterTable {
    #[inline]
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn contains(&self, register: Register) -> bool {
        ((1 << register.index()) & self.0) > 0
    }

    #[inline]
    pub fn vacant(&self, register: Register) -> bool {
        !self.contains(register)
    }

    /// Take the first vacant general purpose register.
    ///
    /// Returns `None` if all of them are occupied.
    pub fn allocate(&mut self) -> Option<Register> {
        let register = Register::ALL[1..]
            .iter()
            .copied()
            .find(|register| self.vacant(*register))?;
        self.insert(register);
        Some(register)
    }

    /// Take the accumulator.
    ///
    /// Returns `None` if it already holds a value.
    pub fn allocate_accumulator(&mut self) -> Option<Register> {
        if self.contains(Register::Eax) {
            return None;
        }
        self.insert(Register::Eax);
        Some(Register::Eax)
    }

    /// Clear the given register, freeing it up for other values.
    ///
    /// Freeing a vacant register does nothing.
    #[inline]
    pub fn free(&mut self, register: Register) {
        self.0 &= !(1 << register.index());
    }

    /// True when no register holds a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    fn insert(&mut self, register: Register) {
        self.0 |= 1 << register.index();
    }
}

impl Default for RegisterTable {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegisterTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RegisterTable({:04b})", self.0)
    }
}
