//! The compilation context external interface (spec §6).
//!
//! Target-dependent sizes and char signedness are read-only inputs the
//! parser core consults but never computes itself. This module provides a
//! small, closed table of supported triples rather than open-ended target
//! parsing — the embedding driver is responsible for turning a
//! `--target`-style string into one of these.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
    Uefi,
    FreeBsd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Aarch64,
    Arm,
}

impl Arch {
    /// Pointer width in bytes for this architecture.
    pub fn pointer_bytes(self) -> u32 {
        match self {
            Arch::X86 | Arch::Arm => 4,
            Arch::X86_64 | Arch::Aarch64 => 8,
        }
    }
}

/// Target-dependent facts the type system needs: word sizes and whether
/// plain `char` is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub os: Os,
    pub arch: Arch,
    pub char_is_signed: bool,
}

impl Target {
    pub const LINUX_X86_64: Target = Target {
        os: Os::Linux,
        arch: Arch::X86_64,
        char_is_signed: true,
    };

    pub const LINUX_AARCH64: Target = Target {
        os: Os::Linux,
        arch: Arch::Aarch64,
        // AArch64 Linux's ABI treats plain `char` as unsigned.
        char_is_signed: false,
    };

    pub const WINDOWS_X86_64: Target = Target {
        os: Os::Windows,
        arch: Arch::X86_64,
        char_is_signed: true,
    };

    pub const MACOS_AARCH64: Target = Target {
        os: Os::MacOs,
        arch: Arch::Aarch64,
        char_is_signed: true,
    };

    /// Best-effort detection of the host running this process, for tests
    /// and standalone tools that have no cross-compilation target of their
    /// own. Falls back to [`Target::LINUX_X86_64`] for hosts this table
    /// does not name.
    pub fn host() -> Target {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("windows", _) => Target::WINDOWS_X86_64,
            ("macos", "aarch64") => Target::MACOS_AARCH64,
            ("linux", "aarch64") => Target::LINUX_AARCH64,
            _ => Target::LINUX_X86_64,
        }
    }

    /// Width, in bytes, of `long`/`unsigned long`: pointer-width on
    /// Unix-like targets, 4 bytes on Windows/UEFI (the LLP64 data model).
    pub fn long_bytes(self) -> u32 {
        match self.os {
            Os::Windows | Os::Uefi => 4,
            Os::Linux | Os::MacOs | Os::FreeBsd => self.arch.pointer_bytes(),
        }
    }

    pub fn pointer_bytes(self) -> u32 {
        self.arch.pointer_bytes()
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::host()
    }
}
