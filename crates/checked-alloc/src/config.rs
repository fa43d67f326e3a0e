//! Fail-fast allocator configuration parameters.

use std::error::Error;
use std::fmt;

/// What the failure path writes to stderr before aborting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Diagnostic {
    /// Abort without writing anything.
    Silent,
    /// A single line naming the failed request.
    #[default]
    Message,
    /// The message line followed by a captured backtrace.
    ///
    /// Capturing a backtrace allocates. The global allocator adapter
    /// downgrades this to [`Diagnostic::Message`].
    Backtrace,
}

/// Configuration for a [`CheckedAllocator`](crate::CheckedAllocator).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailFastConfig {
    /// Alignment, in bytes, of every block returned by `allocate(size)`.
    ///
    /// Default: 16, the `malloc` guarantee on 64-bit targets.
    /// Must be a power of two no greater than [`FailFastConfig::MAX_ALIGN`].
    pub align: usize,

    /// Diagnostic emitted before the process aborts.
    pub diagnostic: Diagnostic,

    /// Prefix of the diagnostic line, usually the program name.
    pub label: &'static str,
}

impl FailFastConfig {
    /// Default block alignment.
    pub const DEFAULT_ALIGN: usize = 16;

    /// Largest accepted block alignment (one 4 KiB page).
    pub const MAX_ALIGN: usize = 4096;

    /// Default diagnostic prefix.
    pub const DEFAULT_LABEL: &'static str = "checked-alloc";

    /// The default configuration, usable in `const` and `static` contexts.
    pub const DEFAULT: Self = Self {
        align: Self::DEFAULT_ALIGN,
        diagnostic: Diagnostic::Message,
        label: Self::DEFAULT_LABEL,
    };

    /// Create a config with the given alignment and default diagnostics.
    pub const fn with_align(align: usize) -> Self {
        Self {
            align,
            ..Self::DEFAULT
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.align.is_power_of_two() || self.align > Self::MAX_ALIGN {
            return Err(ConfigError::InvalidAlignment { align: self.align });
        }
        if is_blank(self.label) {
            return Err(ConfigError::EmptyLabel);
        }
        Ok(())
    }
}

impl Default for FailFastConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether `label` is empty or only ASCII whitespace.
///
/// `const` so [`FailFastGlobal::with_label`](crate::FailFastGlobal::with_label)
/// can reject a blank label while building a `static`.
pub(crate) const fn is_blank(label: &str) -> bool {
    let bytes = label.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_whitespace() {
            return false;
        }
        i += 1;
    }
    true
}

/// Errors detected during [`FailFastConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Alignment is zero, not a power of two, or above `MAX_ALIGN`.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// The diagnostic label is empty or whitespace.
    EmptyLabel,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAlignment { align } => write!(
                f,
                "invalid alignment {align}: must be a power of two no greater than {}",
                FailFastConfig::MAX_ALIGN
            ),
            Self::EmptyLabel => write!(f, "diagnostic label is empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FailFastConfig::default();
        assert_eq!(config.align, 16);
        assert_eq!(config.diagnostic, Diagnostic::Message);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_power_of_two_alignment_rejected() {
        for align in [0, 3, 12, 100] {
            let config = FailFastConfig::with_align(align);
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidAlignment { align })
            );
        }
    }

    #[test]
    fn alignment_above_page_rejected() {
        assert!(FailFastConfig::with_align(4096).validate().is_ok());
        assert!(FailFastConfig::with_align(8192).validate().is_err());
    }

    #[test]
    fn blank_label_rejected() {
        let config = FailFastConfig {
            label: "  ",
            ..FailFastConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyLabel));
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank("checked-alloc"));
        assert!(!is_blank("  x "));
    }
}
