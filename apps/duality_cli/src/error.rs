use std::fmt;

/// Errors the CLI driver can produce that don't originate in the kernel
/// itself: reading stdin/a file, or source text this crate has no parser
/// for. Hand-rolled `Display`/`Error`, matching the teacher's
/// `InterfaceError`/`ParseError` idiom — no `thiserror`, no `anyhow`.
#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    UnrecognizedProgram,
    Kernel(duality_core::KernelError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "i/o error: {}", e),
            CliError::UnrecognizedProgram => {
                write!(f, "no surface parser is wired into this kernel yet; source text must match one of the built-in worked examples")
            }
            CliError::Kernel(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::UnrecognizedProgram => None,
            CliError::Kernel(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<duality_core::KernelError> for CliError {
    fn from(e: duality_core::KernelError) -> Self {
        CliError::Kernel(e)
    }
}
