//! Error kinds surfaced to the host and to the toolkit.

/// Everything that can go wrong inside the adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation was attempted in a state that forbids it, such as
    /// creating a second window adapter or restoring a GL snapshot that was
    /// never taken.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The toolkit asked for a native window operation the embedding refuses
    /// (child windows, menu bars, focus grabs, input methods, ...).
    #[error("unsupported native window operation: {0}")]
    Unsupported(&'static str),

    /// An OpenGL failure. `code` is the GL error or framebuffer status code.
    #[error("GL error 0x{code:04X}: {message}")]
    Gl {
        /// The GL error enum or framebuffer status.
        code: u32,
        /// What was being attempted, plus any driver log.
        message: String,
    },
}

impl Error {
    /// Shorthand for an [`Error::Gl`] with no meaningful error code, e.g. a
    /// shader log or a failed object allocation.
    pub(crate) fn gl(message: impl Into<String>) -> Self {
        Self::Gl {
            code: 0,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_errors_render_their_code_in_hex() {
        let err = Error::Gl {
            code: 0x8CD6,
            message: "framebuffer incomplete".into(),
        };
        assert_eq!(err.to_string(), "GL error 0x8CD6: framebuffer incomplete");
    }

    #[test]
    fn unsupported_names_the_operation() {
        let err = Error::Unsupported("create_child_window");
        assert!(err.to_string().contains("create_child_window"));
    }
}
