// Conversions feeding the `wrap_err!` macro
use crate::error::Error;

/// Anything that can become the boxed `source` of an operation error.
pub trait IntoBlobdirError {
    fn into_error(self) -> Error;
}

impl IntoBlobdirError for Error {
    fn into_error(self) -> Error {
        self
    }
}

impl IntoBlobdirError for opendal::Error {
    fn into_error(self) -> Error {
        self.into()
    }
}

impl IntoBlobdirError for std::io::Error {
    fn into_error(self) -> Error {
        self.into()
    }
}

/// Wrap the error of a Result-producing expression into an operation variant
/// carrying `source: Box<Error>`.
///
/// ```ignore
/// wrap_err!(deleter.delete(path, true).await, DeleteFailed { path: path.to_string(), recursive: true })?
/// ```
#[macro_export]
macro_rules! wrap_err {
    ($expr:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        $expr.map_err(|e| {
            let src: $crate::error::Error = $crate::storage::utils::error::IntoBlobdirError::into_error(e);
            $crate::error::Error::$variant { $($field: $value),*, source: Box::new(src) }
        })
    }};
}
